use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::session::{self, SessionStore};
use crate::url_builder::{build_url, QueryParams};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session expired or invalid; signed out")]
    Unauthorized,

    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: Value },

    #[error("Session store error: {0}")]
    Store(#[from] session::StoreError),
}

/// Feature areas of the admin portal and where they live on the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Coaches,
    Courses,
    Credentials,
    Payments,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Users,
        Resource::Coaches,
        Resource::Courses,
        Resource::Credentials,
        Resource::Payments,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Coaches => "coaches",
            Resource::Courses => "courses",
            Resource::Credentials => "credentials",
            Resource::Payments => "payments",
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }
}

impl std::str::FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.path().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resource '{}'", s))
    }
}

/// HTTP client for the backend. Every URL goes through the URL builder and
/// carries the stored bearer token when there is one.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            config,
            store,
        })
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub async fn get(&self, endpoint: &str, params: &QueryParams) -> Result<Value, ClientError> {
        self.send::<()>(Method::GET, endpoint, params, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        self.send(Method::POST, endpoint, &QueryParams::new(), Some(body))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        self.send(Method::PUT, endpoint, &QueryParams::new(), Some(body))
            .await
    }

    pub async fn delete(&self, endpoint: &str, params: &QueryParams) -> Result<Value, ClientError> {
        self.send::<()>(Method::DELETE, endpoint, params, None).await
    }

    pub async fn list(&self, resource: Resource, params: &QueryParams) -> Result<Value, ClientError> {
        self.get(resource.path(), params).await
    }

    pub async fn fetch(&self, resource: Resource, id: &str) -> Result<Value, ClientError> {
        self.get(&resource.item_path(id), &QueryParams::new()).await
    }

    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        params: &QueryParams,
        body: Option<&B>,
    ) -> Result<Value, ClientError> {
        let url = build_url(&self.config, endpoint, params);
        tracing::debug!(method = %method, url = %url, "api request");

        let mut request = self.http.request(method, url);
        if let Some(token) = session::read_token(self.store.as_ref()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("api rejected credentials, clearing stored session");
            session::clear_session(self.store.as_ref())?;
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ClientError::Status { status, body });
        }
        Ok(body)
    }
}
