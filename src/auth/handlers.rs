use anyhow::Context;
use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        extractors::JsonBody,
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
    },
    error::{ApiError, ApiResult, MsgResponse},
    state::AppState,
    users::{repo::StoreError, repo_types::NewUser},
};

// Unknown email and wrong password share this response.
const LOGIN_FAILED: &str = "User not found";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Missing, null and empty values all count as absent.
fn required(value: Option<String>, msg: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(msg.into()))
}

// Runs before the presence check, so a blank email counts as missing.
fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MsgResponse>)> {
    let RegisterRequest {
        name,
        email,
        password,
        confirmpassword,
    } = payload;

    let name = required(name, "Name is required")?;
    let email = required(email.map(normalize_email), "Email is required")?;
    let password = required(password, "Password is required")?;
    let confirmpassword = required(confirmpassword, "Password confirmation is required")?;

    if confirmpassword != password {
        warn!(email = %email, "password confirmation mismatch");
        return Err(ApiError::Validation("Passwords do not match".into()));
    }

    // Ensure email is not taken
    let existing = state
        .users
        .find_by_email(&email)
        .await
        .context("find user by email")?;
    if existing.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Validation("Email already in use".into()));
    }

    let password_hash = hash_password_blocking(password, state.config.bcrypt_cost).await?;

    let user = match state
        .users
        .insert(NewUser {
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!("email claimed by a concurrent registration");
            return Err(ApiError::Validation("Email already in use".into()));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("create user").into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MsgResponse::new("User created successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let email = required(email.map(normalize_email), "Email is required")?;
    let password = required(password, "Password is required")?;

    let Some(user) = state
        .users
        .find_by_email(&email)
        .await
        .context("find user by email")?
    else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::NotFound(LOGIN_FAILED.into()));
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::NotFound(LOGIN_FAILED.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).context("sign token")?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        msg: "Authentication successful".into(),
        token,
    }))
}
