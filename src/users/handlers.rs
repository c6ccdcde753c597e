use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::ApiResult,
    state::AppState,
    users::{
        dto::{
            Data, LoginRequest, RegisterRequest, RegisteredUser, TokenResponse, UpdateRequest,
            UserProfile,
        },
        services,
        session::CurrentUser,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/users/current", get(get_current).patch(update_current))
        .route("/users/logout", delete(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<Data<RegisteredUser>>> {
    let Json(payload) = payload?;
    let user = services::register(state.store.as_ref(), payload).await?;
    Ok(Json(Data::new(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Data<TokenResponse>>> {
    let Json(payload) = payload?;
    let token = services::login(state.store.as_ref(), payload).await?;
    Ok(Json(Data::new(TokenResponse { token })))
}

#[instrument(skip_all)]
pub async fn get_current(CurrentUser(user): CurrentUser) -> Json<Data<UserProfile>> {
    Json(Data::new(user.into()))
}

// CurrentUser runs before the body is read, so a bad token is 401 even with a bad body.
#[instrument(skip_all)]
pub async fn update_current(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Data<UserProfile>>> {
    let Json(payload) = payload?;
    let user = services::update(state.store.as_ref(), &user, payload).await?;
    Ok(Json(Data::new(user.into())))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Data<&'static str>>> {
    services::logout(state.store.as_ref(), &user).await?;
    Ok(Json(Data::new("OK")))
}
