use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, password::verify_password, Claims};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/login - authenticate and receive a session token.
///
/// Unknown email and wrong password fail with the same response, so the
/// caller cannot tell which case occurred.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .store
        .users()
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let claims = Claims::new(
        user.email.clone(),
        user.name.clone(),
        state.security.jwt_expiry_hours,
    );
    let token = auth::generate_jwt(&claims, &state.security.jwt_secret)?;

    tracing::info!(user_id = %user.id, "login successful");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token
    })))
}
