/**
 * Blog posts and their comments
 * Posts are owned by their author; comments by theirs, with the post author
 * allowed to moderate.
 */
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{Validator, MAX_COMMENT_LEN, MAX_TITLE_LEN};
use crate::auth::{authorize, Action, Identity, Owners, ResourceKind};
use crate::db::models::{BlogPost, BlogPostDetail, Comment, NewBlogPost, NewComment};
use crate::db::Store;
use crate::error::AppError;

/// Posts have no practical upper bound on content beyond the body size limit.
const MAX_CONTENT_LEN: usize = 200_000;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub body: Option<String>,
}

// ============================================================================
// Posts
// ============================================================================

pub async fn list_posts(store: &dyn Store) -> Result<Vec<BlogPost>, AppError> {
    Ok(store.list_posts().await?)
}

async fn find_post(store: &dyn Store, id: Uuid) -> Result<BlogPost, AppError> {
    store
        .find_post(id)
        .await?
        .ok_or(AppError::NotFound("Blog post"))
}

/// Post with its comments in insertion order.
pub async fn get_post(store: &dyn Store, id: Uuid) -> Result<BlogPostDetail, AppError> {
    let post = find_post(store, id).await?;
    let comments = store.list_comments_for_post(post.id).await?;
    Ok(BlogPostDetail { post, comments })
}

pub async fn create_post(
    store: &dyn Store,
    identity: &Identity,
    input: PostInput,
) -> Result<BlogPost, AppError> {
    authorize(identity, Action::Create, ResourceKind::BlogPost, Owners::none())?;

    let mut v = Validator::new();
    let title = v.required("title", input.title.as_deref(), MAX_TITLE_LEN);
    let content = v.required("content", input.content.as_deref(), MAX_CONTENT_LEN);
    v.finish()?;

    let post = store
        .insert_post(NewBlogPost {
            title,
            content,
            author: identity.user_id,
        })
        .await?;

    tracing::info!(post_id = %post.id, author = %post.author, "blog post created");
    Ok(post)
}

pub async fn update_post(
    store: &dyn Store,
    identity: &Identity,
    id: Uuid,
    input: PostInput,
) -> Result<BlogPost, AppError> {
    let mut post = find_post(store, id).await?;
    authorize(
        identity,
        Action::Update,
        ResourceKind::BlogPost,
        Owners::of(post.author),
    )?;

    let mut v = Validator::new();
    if let Some(title) = v.optional_non_blank("title", input.title.as_deref(), MAX_TITLE_LEN) {
        post.title = title;
    }
    if let Some(content) =
        v.optional_non_blank("content", input.content.as_deref(), MAX_CONTENT_LEN)
    {
        post.content = content;
    }
    v.finish()?;

    post.updated_at = Utc::now();
    store
        .update_post(&post)
        .await?
        .ok_or(AppError::NotFound("Blog post"))
}

/// Delete the post, then its comments.
///
/// The cascade is best effort: if it fails the post is still gone and the
/// leftover comments are unreachable, since comments are only ever read
/// through an existing parent.
pub async fn delete_post(store: &dyn Store, identity: &Identity, id: Uuid) -> Result<(), AppError> {
    let post = find_post(store, id).await?;
    authorize(
        identity,
        Action::Delete,
        ResourceKind::BlogPost,
        Owners::of(post.author),
    )?;

    if !store.delete_post(id).await? {
        return Err(AppError::NotFound("Blog post"));
    }

    match store.delete_comments_for_post(id).await {
        Ok(removed) => {
            tracing::info!(post_id = %id, comments_removed = removed, "blog post deleted")
        }
        Err(e) => tracing::warn!(
            post_id = %id,
            error = %e,
            "blog post deleted but comment cleanup failed"
        ),
    }
    Ok(())
}

// ============================================================================
// Comments
// ============================================================================

pub async fn list_comments(store: &dyn Store, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
    let post = find_post(store, post_id).await?;
    Ok(store.list_comments_for_post(post.id).await?)
}

pub async fn create_comment(
    store: &dyn Store,
    identity: &Identity,
    post_id: Uuid,
    input: CommentInput,
) -> Result<Comment, AppError> {
    authorize(identity, Action::Create, ResourceKind::Comment, Owners::none())?;

    let mut v = Validator::new();
    let body = v.required("body", input.body.as_deref(), MAX_COMMENT_LEN);
    v.finish()?;

    let post = find_post(store, post_id).await?;
    let comment = store
        .insert_comment(NewComment {
            body,
            author: identity.user_id,
            post_id: post.id,
        })
        .await?;

    tracing::debug!(comment_id = %comment.id, post_id = %post.id, "comment created");
    Ok(comment)
}

pub async fn delete_comment(
    store: &dyn Store,
    identity: &Identity,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<(), AppError> {
    let post = find_post(store, post_id).await?;
    let comment = store
        .find_comment(comment_id)
        .await?
        .filter(|c| c.post_id == post.id)
        .ok_or(AppError::NotFound("Comment"))?;

    authorize(
        identity,
        Action::Delete,
        ResourceKind::Comment,
        Owners::with_parent(comment.author, post.author),
    )?;

    if !store.delete_comment(comment.id).await? {
        return Err(AppError::NotFound("Comment"));
    }
    tracing::info!(comment_id = %comment.id, post_id = %post.id, "comment deleted");
    Ok(())
}
