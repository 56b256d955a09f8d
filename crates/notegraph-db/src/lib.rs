//! # notegraph-db
//!
//! PostgreSQL database layer for notegraph.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, projects, notes, and links
//! - Graph assembly over note links
//!
//! ## Example
//!
//! ```rust,ignore
//! use notegraph_db::Database;
//! use notegraph_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notegraph").await?;
//!
//!     let note = db.notes.insert(owner_id, CreateNoteRequest {
//!         title: "Reading list".to_string(),
//!         content: Some("Start with the borrow checker chapter.".to_string()),
//!         project_id: None,
//!         tags: Some(vec!["rust".to_string()]),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod links;
pub mod notes;
pub mod pool;
pub mod projects;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use notegraph_core::*;

// Re-export repository implementations
pub use links::PgLinkRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use projects::PgProjectRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User rows (provisioned by the identity service).
    pub users: PgUserRepository,
    /// Projects grouping notes per user.
    pub projects: PgProjectRepository,
    /// Note CRUD operations.
    pub notes: PgNoteRepository,
    /// Directed note links and graph assembly.
    pub links: PgLinkRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            projects: PgProjectRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            links: PgLinkRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
