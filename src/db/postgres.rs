//! Postgres-backed store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::models::{
    BlogPost, Comment, Message, NewBlogPost, NewComment, NewMessage, NewProject, NewUser, Project,
    User,
};
use super::{Store, StoreError, StoreResult};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";
const PROJECT_COLUMNS: &str =
    "id, title, description, image_url, repo_url, live_url, created_at, updated_at";
const POST_COLUMNS: &str = "id, title, content, author, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, body, author, post_id, created_at";
const MESSAGE_COLUMNS: &str = "id, name, email, message, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Users keep `role` as TEXT; it is parsed on the way out.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("user {} has role {:?}", row.id, row.role)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

/// Map unique-constraint violations on `users` to a conflict naming the field.
fn map_user_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            let what = if constraint.contains("username") {
                "Username already taken"
            } else if constraint.contains("email") {
                "Email already registered"
            } else {
                "User already exists"
            };
            return StoreError::Conflict(what.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_insert_error)?;
        row.try_into()
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE username = $1 OR LOWER(email) = LOWER($2) \
             ORDER BY created_at LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        Ok(sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (title, description, image_url, repo_url, live_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(&project.repo_url)
        .bind(&project.live_url)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Option<Project>> {
        Ok(sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects \
             SET title = $1, description = $2, image_url = $3, repo_url = $4, live_url = $5, \
                 updated_at = now() \
             WHERE id = $6 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(&project.repo_url)
        .bind(&project.live_url)
        .bind(project.id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_post(&self, post: NewBlogPost) -> StoreResult<BlogPost> {
        Ok(sqlx::query_as::<_, BlogPost>(&format!(
            "INSERT INTO blog_posts (title, content, author) \
             VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<BlogPost>> {
        Ok(sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_posts(&self) -> StoreResult<Vec<BlogPost>> {
        Ok(sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_post(&self, post: &BlogPost) -> StoreResult<Option<BlogPost>> {
        Ok(sqlx::query_as::<_, BlogPost>(&format!(
            "UPDATE blog_posts SET title = $1, content = $2, updated_at = now() \
             WHERE id = $3 RETURNING {POST_COLUMNS}"
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        Ok(sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (body, author, post_id) \
             VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(&comment.body)
        .bind(comment.author)
        .bind(comment.post_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_comments_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY seq"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comments_for_post(&self, post_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message> {
        Ok(sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (name, email, message) \
             VALUES ($1, $2, $3) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        Ok(sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_messages(&self) -> StoreResult<Vec<Message>> {
        Ok(sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
