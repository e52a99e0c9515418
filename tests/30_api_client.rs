mod common;

use std::sync::Arc;

use anyhow::Result;
use pickleball_portal::auth::{self, AuthError};
use pickleball_portal::client::{ApiClient, ClientError, Resource};
use pickleball_portal::session::{
    read_session, read_token, MemorySessionStore, Role, SessionRead, SessionStore, TOKEN_KEY, USER_KEY,
};
use pickleball_portal::url_builder::QueryParams;
use reqwest::StatusCode;

#[tokio::test]
async fn sign_in_persists_user_and_token() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(backend.api_config(), store.clone())?;

    let session = auth::sign_in(&client, "coach@example.com", common::PASSWORD).await?;

    assert_eq!(session.role, Some(Role::Coach));
    assert_eq!(read_token(store.as_ref()), Some(common::TOKEN.to_string()));
    match read_session(store.as_ref()) {
        SessionRead::Present(stored) => {
            assert_eq!(stored.role, Some(Role::Coach));
            assert_eq!(stored.extra["email"], "coach@example.com");
        }
        other => panic!("expected stored session, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn failed_sign_in_leaves_store_empty() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(backend.api_config(), store.clone())?;

    let err = auth::sign_in(&client, "coach@example.com", "wrong").await.unwrap_err();

    assert!(matches!(err, AuthError::Client(ClientError::Unauthorized)));
    assert_eq!(store.get(USER_KEY)?, None);
    assert_eq!(store.get(TOKEN_KEY)?, None);
    Ok(())
}

#[tokio::test]
async fn requests_carry_bearer_token_and_query() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = Arc::new(
        MemorySessionStore::new()
            .with_entry(USER_KEY, r#"{"role":"COACH"}"#)
            .with_entry(TOKEN_KEY, common::TOKEN),
    );
    let client = ApiClient::new(backend.api_config(), store)?;

    let params = QueryParams::new().with("level", vec![2, 3]).with("coach", None::<u32>);
    let body = client.list(Resource::Courses, &params).await?;

    assert_eq!(body["items"][0]["title"], "Third-shot drops");
    assert_eq!(body["query"], "level=2&level=3");
    Ok(())
}

#[tokio::test]
async fn rejected_token_clears_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = Arc::new(
        MemorySessionStore::new()
            .with_entry(USER_KEY, r#"{"role":"ADMIN"}"#)
            .with_entry(TOKEN_KEY, "stale-token"),
    );
    let client = ApiClient::new(backend.api_config(), store.clone())?;

    let err = client.get("courses", &QueryParams::new()).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert_eq!(read_session(store.as_ref()), SessionRead::Missing);
    assert_eq!(read_token(store.as_ref()), None);
    Ok(())
}

#[tokio::test]
async fn server_errors_keep_status_and_body() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = Arc::new(MemorySessionStore::new().with_entry(TOKEN_KEY, common::TOKEN));
    let client = ApiClient::new(backend.api_config(), store.clone())?;

    match client.list(Resource::Payments, &QueryParams::new()).await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "payment provider offline");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    // Only a 401 signs the user out.
    assert_eq!(read_token(store.as_ref()), Some(common::TOKEN.to_string()));
    Ok(())
}
