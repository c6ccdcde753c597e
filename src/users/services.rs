use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    users::{
        dto::{LoginRequest, RegisterRequest, UpdateRequest},
        password::{hash_password_blocking, verify_blocking},
        repo::UserStore,
        repo_types::{NewUser, ProfileChanges, User},
        session,
        validation::{validate_login, validate_register, validate_update, FieldError},
    },
};

pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> ApiResult<User> {
    let valid = validate_register(&req).map_err(ApiError::InvalidInput)?;

    if store.find_by_username(&valid.username).await?.is_some() {
        warn!(username = %valid.username, "username already registered");
        return Err(ApiError::Conflict("Username already registered".into()));
    }

    let password_hash = hash_password_blocking(valid.password)
        .await
        .map_err(ApiError::Internal)?;
    let user = store
        .create(NewUser {
            name: valid.name,
            username: valid.username,
            email: valid.email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Verifies credentials and starts a new session, returning its token.
///
/// Unknown email and wrong password fail identically.
pub async fn login(store: &dyn UserStore, req: LoginRequest) -> ApiResult<String> {
    let valid = validate_login(&req).map_err(ApiError::InvalidInput)?;

    let user = store.find_by_email(&valid.email).await?;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let ok = verify_blocking(valid.password, stored)
        .await
        .map_err(ApiError::Internal)?;

    let user = match (user, ok) {
        (Some(user), true) => user,
        (Some(user), false) => {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }
        (None, _) => {
            warn!("login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = session::issue();
    session::attach(store, &user, &token).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

pub async fn update(store: &dyn UserStore, current: &User, req: UpdateRequest) -> ApiResult<User> {
    let valid = validate_update(&req).map_err(ApiError::InvalidInput)?;

    if let Some(username) = &valid.username {
        if username != &current.username {
            return Err(ApiError::InvalidInput(vec![FieldError::new(
                "username",
                "cannot be changed",
            )]));
        }
    }

    let password_hash = match valid.password {
        Some(plain) => Some(
            hash_password_blocking(plain)
                .await
                .map_err(ApiError::Internal)?,
        ),
        None => None,
    };
    let changes = ProfileChanges {
        name: valid.name,
        email: valid.email,
        password_hash,
    };
    if changes.is_empty() {
        return Ok(current.clone());
    }

    let user = store.update_profile(&current.username, changes).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(user)
}

pub async fn logout(store: &dyn UserStore, current: &User) -> ApiResult<()> {
    session::revoke(store, current).await?;
    info!(user_id = %current.id, "user logged out");
    Ok(())
}
