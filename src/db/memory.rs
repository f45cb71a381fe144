//! In-memory store used when `DATABASE_URL` is unset, and by the test suite.
//! Records live in insertion-ordered vectors behind a single lock.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    BlogPost, Comment, Message, NewBlogPost, NewComment, NewMessage, NewProject, NewUser, Project,
    User,
};
use super::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    projects: Vec<Project>,
    posts: Vec<BlogPost>,
    comments: Vec<Comment>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Replace the element with a matching id, returning the stored copy.
fn replace_by<T: Clone>(items: &mut [T], updated: &T, same: impl Fn(&T) -> bool) -> Option<T> {
    let slot = items.iter_mut().find(|item| same(item))?;
    *slot = updated.clone();
    Some(slot.clone())
}

fn remove_by<T>(items: &mut Vec<T>, same: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !same(item));
    items.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        let _guard = self.data.read().await;
        Ok(start.elapsed())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("Username already taken".into()));
        }
        if data
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict("Email already registered".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.username == username || u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            image_url: project.image_url,
            repo_url: project.repo_url,
            live_url: project.live_url,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let data = self.data.read().await;
        Ok(data.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let data = self.data.read().await;
        Ok(data.projects.iter().rev().cloned().collect())
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Option<Project>> {
        let mut data = self.data.write().await;
        Ok(replace_by(&mut data.projects, project, |p| p.id == project.id))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        Ok(remove_by(&mut data.projects, |p| p.id == id))
    }

    async fn insert_post(&self, post: NewBlogPost) -> StoreResult<BlogPost> {
        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            author: post.author,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<BlogPost>> {
        let data = self.data.read().await;
        Ok(data.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self) -> StoreResult<Vec<BlogPost>> {
        let data = self.data.read().await;
        Ok(data.posts.iter().rev().cloned().collect())
    }

    async fn update_post(&self, post: &BlogPost) -> StoreResult<Option<BlogPost>> {
        let mut data = self.data.write().await;
        Ok(replace_by(&mut data.posts, post, |p| p.id == post.id))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        Ok(remove_by(&mut data.posts, |p| p.id == id))
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            body: comment.body,
            author: comment.author,
            post_id: comment.post_id,
            created_at: Utc::now(),
        };
        self.data.write().await.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let data = self.data.read().await;
        Ok(data.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let data = self.data.read().await;
        Ok(data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        Ok(remove_by(&mut data.comments, |c| c.id == id))
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let before = data.comments.len();
        data.comments.retain(|c| c.post_id != post_id);
        Ok((before - data.comments.len()) as u64)
    }

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            name: message.name,
            email: message.email,
            message: message.message,
            created_at: Utc::now(),
        };
        self.data.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let data = self.data.read().await;
        Ok(data.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_messages(&self) -> StoreResult<Vec<Message>> {
        let data = self.data.read().await;
        Ok(data.messages.iter().rev().cloned().collect())
    }

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        Ok(remove_by(&mut data.messages, |m| m.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Standard,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_conflict() {
        let store = MemoryStore::new();
        store.insert_user(new_user("alice", "alice@example.com")).await.unwrap();

        let dup_name = store.insert_user(new_user("alice", "other@example.com")).await;
        assert!(matches!(dup_name, Err(StoreError::Conflict(_))));

        let dup_email = store.insert_user(new_user("alicia", "ALICE@example.com")).await;
        assert!(matches!(dup_email, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_lookup_by_username_or_email() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("alice", "alice@example.com")).await.unwrap();

        let by_name = store.find_user_by_username_or_email("alice", "alice").await.unwrap();
        assert_eq!(by_name.unwrap().id, alice.id);

        let by_email = store
            .find_user_by_username_or_email("Alice@Example.com", "Alice@Example.com")
            .await
            .unwrap();
        assert_eq!(by_email.unwrap().id, alice.id);

        let missing = store.find_user_by_username_or_email("bob", "bob").await.unwrap();
        assert!(missing.is_none());

        // Each single-column lookup only consults its own column.
        assert!(store.find_user_by_email("alice").await.unwrap().is_none());
        assert!(store
            .find_user_by_username("alice@example.com")
            .await
            .unwrap()
            .is_none());
        let by_email = store.find_user_by_email("ALICE@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, alice.id);
    }

    #[tokio::test]
    async fn test_posts_newest_first_comments_in_insertion_order() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let first = store
            .insert_post(NewBlogPost { title: "one".into(), content: "a".into(), author })
            .await
            .unwrap();
        let second = store
            .insert_post(NewBlogPost { title: "two".into(), content: "b".into(), author })
            .await
            .unwrap();

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts[0].id, second.id);
        assert_eq!(posts[1].id, first.id);

        for body in ["c1", "c2", "c3"] {
            store
                .insert_comment(NewComment { body: body.into(), author, post_id: first.id })
                .await
                .unwrap();
        }
        let bodies: Vec<String> = store
            .list_comments_for_post(first.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.body)
            .collect();
        assert_eq!(bodies, ["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn test_delete_comments_for_post_only_touches_that_post() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        for post_id in [p1, p1, p2] {
            store
                .insert_comment(NewComment { body: "x".into(), author, post_id })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_comments_for_post(p1).await.unwrap(), 2);
        assert!(store.list_comments_for_post(p1).await.unwrap().is_empty());
        assert_eq!(store.list_comments_for_post(p2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_project_returns_none() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let ghost = Project {
            id: Uuid::new_v4(),
            title: "ghost".into(),
            description: "gone".into(),
            image_url: None,
            repo_url: None,
            live_url: None,
            created_at: now,
            updated_at: now,
        };
        assert!(store.update_project(&ghost).await.unwrap().is_none());
        assert!(!store.delete_project(ghost.id).await.unwrap());
    }
}
