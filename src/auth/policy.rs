//! Authorization policy: one pure decision for every protected mutation.
//!
//! Rules, first match wins:
//! 1. admins may do anything;
//! 2. any caller may create a blog post or comment (and becomes its owner);
//! 3. only the author may update or delete a blog post;
//! 4. a comment may be deleted by its author or by the parent post's author;
//! 5. any authenticated caller may create, update or delete a project;
//! 6. messages are admin-only (rule 1), so everything else is denied.

use uuid::Uuid;

use super::Identity;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    BlogPost,
    Comment,
    Message,
}

impl ResourceKind {
    fn label(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::BlogPost => "blog post",
            ResourceKind::Comment => "comment",
            ResourceKind::Message => "message",
        }
    }
}

/// Ownership facts about the target, as loaded at the start of the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Owners {
    /// Author of the resource itself.
    pub owner: Option<Uuid>,
    /// Author of the enclosing resource (the post a comment belongs to).
    pub parent_owner: Option<Uuid>,
}

impl Owners {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            parent_owner: None,
        }
    }

    pub fn with_parent(owner: Uuid, parent_owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            parent_owner: Some(parent_owner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

pub fn can_perform(
    identity: &Identity,
    action: Action,
    kind: ResourceKind,
    owners: Owners,
) -> Decision {
    use Action::*;
    use ResourceKind::*;

    if identity.is_admin() {
        return Decision::Allow;
    }

    let caller = Some(identity.user_id);
    match (action, kind) {
        (Create, BlogPost | Comment) => Decision::Allow,
        (Update | Delete, BlogPost) => (owners.owner == caller).into(),
        (Delete, Comment) => (owners.owner == caller || owners.parent_owner == caller).into(),
        (Create | Update | Delete, Project) => Decision::Allow,
        _ => Decision::Deny,
    }
}

/// `can_perform`, turned into `Forbidden` on deny.
pub fn authorize(
    identity: &Identity,
    action: Action,
    kind: ResourceKind,
    owners: Owners,
) -> Result<(), AppError> {
    if can_perform(identity, action, kind, owners).is_allowed() {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.user_id,
        role = %identity.role,
        action = ?action,
        kind = kind.label(),
        "authorization denied"
    );
    let verb = match action {
        Action::Create => "create",
        Action::Read => "view",
        Action::Update => "update",
        Action::Delete => "delete",
    };
    Err(AppError::forbidden(format!(
        "Not authorized to {} this {}",
        verb,
        kind.label()
    )))
}
