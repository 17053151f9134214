use anyhow::Context;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    users::repo_types::PublicUser,
};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/:id", get(get_user))
}

/// `AuthUser` comes first so the token gate runs before anything else.
#[instrument(skip(auth, state))]
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let AuthUser(claims) = auth;
    let not_found = || ApiError::NotFound("User not found".into());

    // An id that can't name a record is just a miss.
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let user = state
        .users
        .find_by_id(id)
        .await
        .context("find user by id")?
        .ok_or_else(not_found)?;

    debug!(user_id = %user.id, requested_by = %claims.id, "user fetched");
    Ok(Json(UserResponse { user }))
}
