/**
 * Contact Routes
 * Anyone may submit; only the admin reads or deletes
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiJson, ApiPath, MessageResponse};
use crate::auth::Identity;
use crate::db::models::Message;
use crate::error::AppError;
use crate::services::messages::{self, MessageInput};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub data: Message,
}

/// POST /api/contact
pub async fn submit_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MessageInput>,
) -> Result<impl IntoResponse, AppError> {
    let data = messages::submit(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Message sent successfully".to_string(),
            data,
        }),
    ))
}

/// GET /api/contact (protected, admin)
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(messages::list(state.store.as_ref(), &identity).await?))
}

/// DELETE /api/contact/{id} (protected, admin)
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    messages::delete(state.store.as_ref(), &identity, id).await?;
    Ok(Json(MessageResponse::new("Message deleted")))
}
