/**
 * Blog Routes
 * Posts and their comments. Reads are public; writes go through `protect`.
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use uuid::Uuid;

use super::{ApiJson, ApiPath, MessageResponse};
use crate::auth::Identity;
use crate::error::AppError;
use crate::services::blog::{self, CommentInput, PostInput};
use crate::state::AppState;

// ============================================================================
// Posts
// ============================================================================

/// GET /api/blog - newest first
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::list_posts(state.store.as_ref()).await?))
}

/// GET /api/blog/{id} - post with its comments
pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::get_post(state.store.as_ref(), id).await?))
}

/// POST /api/blog (protected)
pub async fn create_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    let post = blog::create_post(state.store.as_ref(), &identity, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blog/{id} (protected, author or admin)
pub async fn update_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    let post = blog::update_post(state.store.as_ref(), &identity, id, payload).await?;
    Ok(Json(post))
}

/// DELETE /api/blog/{id} (protected, author or admin)
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    blog::delete_post(state.store.as_ref(), &identity, id).await?;
    Ok(Json(MessageResponse::new("Blog post deleted")))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /api/blog/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(blog::list_comments(state.store.as_ref(), post_id).await?))
}

/// POST /api/blog/{id}/comments (protected)
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(post_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CommentInput>,
) -> Result<impl IntoResponse, AppError> {
    let comment = blog::create_comment(state.store.as_ref(), &identity, post_id, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/blog/{id}/comments/{comment_id} (protected)
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((post_id, comment_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    blog::delete_comment(state.store.as_ref(), &identity, post_id, comment_id).await?;
    Ok(Json(MessageResponse::new("Comment deleted")))
}
