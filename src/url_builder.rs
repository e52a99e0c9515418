//! Composes absolute backend URLs from the configured API location and a
//! caller-supplied endpoint.
//!
//! Endpoints are relative (`"users"`, `"courses/42?expand=coach"`) unless they
//! start with `/`. Relative endpoints land under `<base path>/<version>` when
//! the base path already has an `api` segment, otherwise under
//! `/api/<version>`. Paths never carry doubled or trailing slashes.

use url::{form_urlencoded, Url};

use crate::config::ApiConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Replaces any earlier value for the key.
    Scalar(String),
    /// Appended as repeated keys, in order.
    List(Vec<String>),
    /// Left out of the query string.
    Absent,
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Scalar(value.clone())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(bool, i32, i64, u32, u64, usize, f64);

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Absent)
    }
}

/// Extra query parameters, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Setting an existing key replaces its value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Groups `key=value` pairs; a key given more than once becomes a list.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match params.entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, ParamValue::List(values))) => values.push(value),
                Some(entry) => {
                    let previous = std::mem::replace(&mut entry.1, ParamValue::Absent);
                    entry.1 = match previous {
                        ParamValue::Scalar(first) => ParamValue::List(vec![first, value]),
                        _ => ParamValue::Scalar(value),
                    };
                }
                None => params.entries.push((key, ParamValue::Scalar(value))),
            }
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Resolves `endpoint` against the configured API and merges `params` into
/// its query.
///
/// Dot segments are resolved the way a browser `URL` resolves them, so a
/// relative endpoint such as `a/../../admin` can climb out of the version
/// prefix (`/api/admin`). Endpoints are trusted caller input.
pub fn build_url(config: &ApiConfig, endpoint: &str, params: &QueryParams) -> Url {
    let (path_part, query_part) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };

    let path = if path_part.starts_with('/') {
        normalize_path(path_part)
    } else if has_api_segment(config.base_path()) {
        normalize_path(&format!(
            "{}/{}/{}",
            config.base_path(),
            config.version(),
            path_part
        ))
    } else {
        normalize_path(&format!("/api/{}/{}", config.version(), path_part))
    };

    let mut url = config.base().clone();
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = query_part
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    for (key, value) in params.iter() {
        match value {
            ParamValue::Scalar(v) => set_pair(&mut pairs, key, v),
            ParamValue::List(values) => {
                pairs.extend(values.iter().map(|v| (key.to_string(), v.clone())));
            }
            ParamValue::Absent => {}
        }
    }

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs.iter());
    }

    tracing::trace!(endpoint, url = %url, "built API url");
    url
}

/// Collapses repeated slashes and drops a trailing one; `/` stays `/`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn has_api_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "api")
}

/// Overwrites the first `key` entry and drops later duplicates, or appends.
fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut index = 0;
            pairs.retain(|(k, _)| {
                let keep = index <= first || k != key;
                index += 1;
                keep
            });
        }
        None => pairs.push((key.to_string(), value.to_string())),
    }
}
