use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::{ApiClient, ClientError};
use crate::config::SecurityConfig;
use crate::session::{self, Role, Session, SessionError, SessionStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, role: Option<Role>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            role,
            exp,
            iat: now.timestamp(),
        }
    }

    /// The session descriptor this token vouches for.
    pub fn to_session(&self) -> Session {
        Session {
            role: self.role.clone(),
            extra: Default::default(),
        }
        .with_field("id", self.sub.clone())
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Sign-in response is missing '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &key)?)
}

/// Mints a gateway token with the configured secret and lifetime.
pub fn issue_session_token(
    security: &SecurityConfig,
    sub: &str,
    role: Role,
) -> Result<String, AuthError> {
    let claims = Claims::new(sub, Some(role), security.jwt_expiry_hours);
    issue_token(&claims, &security.jwt_secret)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(data.claims)
}

/// Signs in against `auth/login` and persists the returned user and token.
pub async fn sign_in(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let response = client
        .post("auth/login", &json!({ "email": email, "password": password }))
        .await?;

    // Some deployments wrap the payload in { "data": ... }.
    let payload = match response.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => response,
    };

    let token = payload
        .get("token")
        .or_else(|| payload.get("accessToken"))
        .and_then(Value::as_str)
        .ok_or(AuthError::MissingField("token"))?;
    let user = payload
        .get("user")
        .cloned()
        .ok_or(AuthError::MissingField("user"))?;

    let session = Session::from_value(user)?;
    session::write_session(client.store(), &session, Some(token))?;
    tracing::info!(role = ?session.role, "signed in");
    Ok(session)
}

pub fn sign_out(store: &dyn SessionStore) -> Result<(), AuthError> {
    session::clear_session(store)?;
    tracing::info!("signed out");
    Ok(())
}
