//! Opaque session tokens stored on the user row.
//!
//! A token is only a lookup key: it carries no claims, and a session is
//! valid exactly as long as the token is persisted on its user. Clearing
//! the column revokes it immediately.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::{debug, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        repo::{StoreError, UserStore},
        repo_types::User,
    },
};

const TOKEN_LEN: usize = 48;

/// Issues a fresh random token from the OS CSPRNG.
pub fn issue() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub async fn attach(store: &dyn UserStore, user: &User, token: &str) -> Result<(), StoreError> {
    store.set_token(&user.username, Some(token)).await?;
    debug!(username = %user.username, "session attached");
    Ok(())
}

/// Resolves a presented token to its user. No match is `None`, not an error.
pub async fn validate(store: &dyn UserStore, presented: &str) -> Result<Option<User>, StoreError> {
    if presented.is_empty() {
        return Ok(None);
    }
    store.find_by_token(presented).await
}

pub async fn revoke(store: &dyn UserStore, user: &User) -> Result<(), StoreError> {
    store.set_token(&user.username, None).await?;
    debug!(username = %user.username, "session revoked");
    Ok(())
}

/// The user owning the token in the `Authorization` header.
///
/// Both `Authorization: <token>` and `Authorization: Bearer <token>` are accepted.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .unwrap_or(header)
            .trim();

        match validate(state.store.as_ref(), token).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!("rejected unknown session token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{memory::MemoryUserStore, repo_types::NewUser};

    async fn seeded() -> (MemoryUserStore, User) {
        let store = MemoryUserStore::default();
        let user = store
            .create(NewUser {
                name: "test".into(),
                username: "test".into(),
                email: "test@example.com".into(),
                password_hash: "x".into(),
            })
            .await
            .expect("create");
        (store, user)
    }

    #[test]
    fn issued_tokens_are_random_alphanumeric() {
        let a = issue();
        let b = issue();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn attach_validate_revoke() {
        let (store, user) = seeded().await;
        let token = issue();

        assert!(validate(&store, &token).await.unwrap().is_none());

        attach(&store, &user, &token).await.expect("attach");
        let found = validate(&store, &token).await.unwrap().expect("token resolves");
        assert_eq!(found.username, "test");

        revoke(&store, &found).await.expect("revoke");
        assert!(validate(&store, &token).await.unwrap().is_none());
        let row = store.find_by_username("test").await.unwrap().unwrap();
        assert!(row.token.is_none());
    }

    #[tokio::test]
    async fn new_login_replaces_previous_token() {
        let (store, user) = seeded().await;
        let first = issue();
        let second = issue();
        attach(&store, &user, &first).await.unwrap();
        attach(&store, &user, &second).await.unwrap();
        assert!(validate(&store, &first).await.unwrap().is_none());
        assert!(validate(&store, &second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_token_never_matches() {
        let (store, _) = seeded().await;
        assert!(validate(&store, "").await.unwrap().is_none());
    }
}
