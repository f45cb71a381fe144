/**
 * User Routes
 * Registration, login and the caller's own profile
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use super::ApiJson;
use crate::auth::Identity;
use crate::error::AppError;
use crate::services::users::{self, LoginInput, RegisterInput};
use crate::state::AppState;

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterInput>,
) -> Result<impl IntoResponse, AppError> {
    let payload = users::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginInput>,
) -> Result<impl IntoResponse, AppError> {
    let payload = users::login(&state, payload).await?;
    Ok(Json(payload))
}

/// GET /api/users/profile (protected)
pub async fn profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::profile(&state, &identity).await?;
    Ok(Json(user))
}
