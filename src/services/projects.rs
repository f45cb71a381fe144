use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{Validator, MAX_MESSAGE_LEN, MAX_TITLE_LEN};
use crate::auth::{authorize, Action, Identity, Owners, ResourceKind};
use crate::db::models::{NewProject, Project};
use crate::db::Store;
use crate::error::AppError;

/// Body for create and update. On update, absent fields keep their value and a
/// blank URL clears it.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
}

pub async fn list(store: &dyn Store) -> Result<Vec<Project>, AppError> {
    Ok(store.list_projects().await?)
}

pub async fn get(store: &dyn Store, id: Uuid) -> Result<Project, AppError> {
    store
        .find_project(id)
        .await?
        .ok_or(AppError::NotFound("Project"))
}

pub async fn create(
    store: &dyn Store,
    identity: &Identity,
    input: ProjectInput,
) -> Result<Project, AppError> {
    authorize(identity, Action::Create, ResourceKind::Project, Owners::none())?;

    let mut v = Validator::new();
    let title = v.required("title", input.title.as_deref(), MAX_TITLE_LEN);
    let description = v.required("description", input.description.as_deref(), MAX_MESSAGE_LEN);
    let image_url = v.url("imageUrl", input.image_url.as_deref());
    let repo_url = v.url("repoUrl", input.repo_url.as_deref());
    let live_url = v.url("liveUrl", input.live_url.as_deref());
    v.finish()?;

    let project = store
        .insert_project(NewProject {
            title,
            description,
            image_url,
            repo_url,
            live_url,
        })
        .await?;

    tracing::info!(project_id = %project.id, user_id = %identity.user_id, "project created");
    Ok(project)
}

pub async fn update(
    store: &dyn Store,
    identity: &Identity,
    id: Uuid,
    input: ProjectInput,
) -> Result<Project, AppError> {
    let mut project = get(store, id).await?;
    authorize(identity, Action::Update, ResourceKind::Project, Owners::none())?;

    let mut v = Validator::new();
    if let Some(title) = v.optional_non_blank("title", input.title.as_deref(), MAX_TITLE_LEN) {
        project.title = title;
    }
    if let Some(description) =
        v.optional_non_blank("description", input.description.as_deref(), MAX_MESSAGE_LEN)
    {
        project.description = description;
    }
    if input.image_url.is_some() {
        project.image_url = v.url("imageUrl", input.image_url.as_deref());
    }
    if input.repo_url.is_some() {
        project.repo_url = v.url("repoUrl", input.repo_url.as_deref());
    }
    if input.live_url.is_some() {
        project.live_url = v.url("liveUrl", input.live_url.as_deref());
    }
    v.finish()?;

    project.updated_at = Utc::now();
    store
        .update_project(&project)
        .await?
        .ok_or(AppError::NotFound("Project"))
}

pub async fn delete(store: &dyn Store, identity: &Identity, id: Uuid) -> Result<(), AppError> {
    get(store, id).await?;
    authorize(identity, Action::Delete, ResourceKind::Project, Owners::none())?;

    if !store.delete_project(id).await? {
        return Err(AppError::NotFound("Project"));
    }
    tracing::info!(project_id = %id, user_id = %identity.user_id, "project deleted");
    Ok(())
}
