pub mod file_store;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;

pub use file_store::FileSessionStore;

/// Store key holding the serialized signed-in user.
pub const USER_KEY: &str = "user";
/// Store key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Coach,
    Learner,
    Unknown(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Coach => "COACH",
            Role::Learner => "LEARNER",
            Role::Unknown(name) => name,
        }
    }

    /// An empty role name carries no role at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, Role::Unknown(name) if name.is_empty())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let role = match name.as_str() {
            "ADMIN" => Role::Admin,
            "COACH" => Role::Coach,
            "LEARNER" => Role::Learner,
            _ => Role::Unknown(name),
        };
        Ok(role)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::from(raw.as_str()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Malformed session: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Persistent session store is not available")]
    Unavailable,

    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The signed-in user as persisted under [`USER_KEY`]. Fields other than
/// `role` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// The role, unless it is absent or blank.
    pub fn effective_role(&self) -> Option<&Role> {
        self.role.as_ref().filter(|role| !role.is_blank())
    }

    pub fn new(role: Role) -> Self {
        Self {
            role: Some(role),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| SessionError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SessionError> {
        if !value.is_object() {
            return Err(SessionError::Malformed(
                "session is not a JSON object".to_string(),
            ));
        }
        if let Some(role) = value.get("role") {
            if !role.is_string() && !role.is_null() {
                return Err(SessionError::Malformed(
                    "role is not a string".to_string(),
                ));
            }
        }
        serde_json::from_value(value).map_err(|e| SessionError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // A map of JSON values with string keys always serializes.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Outcome of reading the persisted session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionRead {
    /// No persistent store in this execution context.
    Unavailable,
    /// Nothing stored, or stored without a role (absent, null or blank).
    Missing,
    Malformed(String),
    Present(Session),
}

/// Key/value persistence for the session, shaped after the browser store the
/// sign-in flow writes to.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub fn read_session(store: &dyn SessionStore) -> SessionRead {
    let raw = match store.get(USER_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return SessionRead::Missing,
        Err(StoreError::Unavailable) => return SessionRead::Unavailable,
        Err(e) => return SessionRead::Malformed(e.to_string()),
    };

    match Session::parse(&raw) {
        Ok(session) if session.effective_role().is_none() => SessionRead::Missing,
        Ok(session) => SessionRead::Present(session),
        Err(SessionError::Malformed(reason)) => SessionRead::Malformed(reason),
    }
}

pub fn read_token(store: &dyn SessionStore) -> Option<String> {
    match store.get(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.trim().is_empty()),
        Err(e) => {
            tracing::debug!("no bearer token available: {}", e);
            None
        }
    }
}

pub fn write_session(
    store: &dyn SessionStore,
    session: &Session,
    token: Option<&str>,
) -> Result<(), StoreError> {
    store.set(USER_KEY, &session.to_json())?;
    match token {
        Some(token) => store.set(TOKEN_KEY, token),
        None => store.remove(TOKEN_KEY),
    }
}

pub fn clear_session(store: &dyn SessionStore) -> Result<(), StoreError> {
    store.remove(USER_KEY)?;
    store.remove(TOKEN_KEY)
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry before the store is shared.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        // Nothing else can hold the lock yet, so take the map directly.
        let entries = match self.entries.get_mut() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Unavailable)?;
        entries.remove(key);
        Ok(())
    }
}

/// Stand-in for execution contexts that have no persistent store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSessionStore;

impl SessionStore for NoSessionStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}
