use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/register - create a new user account.
///
/// The email is checked for an existing user first; the unique index on the
/// user collection backstops registrations that race past the check. No token
/// is issued at registration time.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let users = state.store.users();

    if users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let password_hash = hash_password(&payload.password)?;

    let user_id = users
        .insert(&payload.name, &payload.email, &password_hash)
        .await?;

    tracing::info!(%user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully"
        })),
    ))
}
