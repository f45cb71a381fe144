pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use models::{
    BlogPost, Comment, Message, NewBlogPost, NewComment, NewMessage, NewProject, NewUser, Project,
    User,
};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/portfolio".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Uniqueness violation; the payload names what collided.
    #[error("{0}")]
    Conflict(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for every resource.
///
/// Each call is atomic for a single record; nothing here spans records except
/// `delete_comments_for_post`, which is best effort. Lists of posts, projects
/// and messages come back newest-first, comments in insertion order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the backing store.
    async fn ping(&self) -> StoreResult<std::time::Duration>;

    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Matches `username` exactly or `email` case-insensitively.
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Case-insensitive on the email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// First user holding either identifier; used for duplicate checks.
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<User>>;

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;
    /// Replaces the stored record with the same id. `None` if it vanished.
    async fn update_project(&self, project: &Project) -> StoreResult<Option<Project>>;
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_post(&self, post: NewBlogPost) -> StoreResult<BlogPost>;
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<BlogPost>>;
    async fn list_posts(&self) -> StoreResult<Vec<BlogPost>>;
    async fn update_post(&self, post: &BlogPost) -> StoreResult<Option<BlogPost>>;
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn list_comments_for_post(&self, post_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;
    /// Returns the number of comments removed.
    async fn delete_comments_for_post(&self, post_id: Uuid) -> StoreResult<u64>;

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message>;
    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>>;
    async fn list_messages(&self) -> StoreResult<Vec<Message>>;
    async fn delete_message(&self, id: Uuid) -> StoreResult<bool>;
}

pub async fn init_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing database connection pool...");
    tracing::debug!(
        "Database URL: {}",
        config.url.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != ':' && c != '/' && c != '@' && c != '.',
            "*"
        )
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'standard',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            image_url TEXT,
            repo_url TEXT,
            live_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            author UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    // No foreign key to blog_posts: the cascade is done by the service layer
    // and stray rows are never listed without their parent.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            seq BIGSERIAL NOT NULL,
            body TEXT NOT NULL,
            author UUID NOT NULL,
            post_id UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    const INDEXES: &[&str] = &[
        "CREATE INDEX IF NOT EXISTS idx_users_email_lower ON users(LOWER(email))",
        "CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_created_at ON blog_posts(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_comments_post_seq ON comments(post_id, seq)",
        "CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at DESC)",
    ];
    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed successfully");

    Ok(())
}
