/**
 * Project Routes
 * Public reads; any authenticated caller may write
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use uuid::Uuid;

use super::{ApiJson, ApiPath, MessageResponse};
use crate::auth::Identity;
use crate::error::AppError;
use crate::services::projects::{self, ProjectInput};
use crate::state::AppState;

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(projects::list(state.store.as_ref()).await?))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(projects::get(state.store.as_ref(), id).await?))
}

/// POST /api/projects (protected)
pub async fn create_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<ProjectInput>,
) -> Result<impl IntoResponse, AppError> {
    let project = projects::create(state.store.as_ref(), &identity, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/{id} (protected)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ProjectInput>,
) -> Result<impl IntoResponse, AppError> {
    let project = projects::update(state.store.as_ref(), &identity, id, payload).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id} (protected)
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    projects::delete(state.store.as_ref(), &identity, id).await?;
    Ok(Json(MessageResponse::new("Project deleted")))
}
