use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::extract::ApiJson;
use super::AppState;
use crate::auth::{self, TokenSigner};
use crate::error::ApiError;
use crate::models::{User, UserProfile};
use crate::records::{Repository, Stored};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user: UserProfile,
}

async fn login(
    State(repo): State<Repository>,
    State(signer): State<Arc<TokenSigner>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let users: Vec<User> = repo
        .list::<User>()
        .await?
        .into_iter()
        .map(Stored::into_record)
        .collect();

    // Argon2 verification blocks, so run it off the async workers
    let LoginRequest { email, password } = request;
    let matched = tokio::task::spawn_blocking(move || {
        auth::authenticate(&users, &email, &password).cloned()
    })
    .await
    .context("Login task failed")?;

    let Some(user) = matched else {
        warn!("Failed login attempt");
        return Err(ApiError::InvalidCredentials);
    };

    let token = signer.issue(&user).context("Failed to issue token")?;
    info!("User {} logged in", user.email);

    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}
