use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{Validator, MAX_MESSAGE_LEN, MAX_NAME_LEN};
use crate::auth::{authorize, Action, Identity, Owners, ResourceKind};
use crate::db::models::{Message, NewMessage};
use crate::db::Store;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Public contact form submission; no identity involved.
pub async fn submit(store: &dyn Store, input: MessageInput) -> Result<Message, AppError> {
    let mut v = Validator::new();
    let name = v.required("name", input.name.as_deref(), MAX_NAME_LEN);
    let email = v.required("email", input.email.as_deref(), MAX_NAME_LEN * 2);
    v.email("email", &email);
    let message = v.required("message", input.message.as_deref(), MAX_MESSAGE_LEN);
    v.finish()?;

    let message = store
        .insert_message(NewMessage {
            name,
            email,
            message,
        })
        .await?;

    tracing::info!(message_id = %message.id, "contact message received");
    Ok(message)
}

pub async fn list(store: &dyn Store, identity: &Identity) -> Result<Vec<Message>, AppError> {
    authorize(identity, Action::Read, ResourceKind::Message, Owners::none())?;
    Ok(store.list_messages().await?)
}

/// Messages have no owner, so the role check runs before the lookup.
pub async fn delete(store: &dyn Store, identity: &Identity, id: Uuid) -> Result<(), AppError> {
    authorize(identity, Action::Delete, ResourceKind::Message, Owners::none())?;

    let message = store
        .find_message(id)
        .await?
        .ok_or(AppError::NotFound("Message"))?;
    if !store.delete_message(message.id).await? {
        return Err(AppError::NotFound("Message"));
    }
    tracing::info!(message_id = %id, "contact message deleted");
    Ok(())
}
