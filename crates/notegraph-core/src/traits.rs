//! Core traits for notegraph abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub project_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
}

/// Request for updating a note. Omitted fields are preserved.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request for listing notes.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Pagination offset.
    pub offset: Option<i64>,
}

/// Repository for note CRUD operations.
///
/// Every method is scoped to the owning user; a note that exists but belongs
/// to someone else behaves exactly like a note that does not exist.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note owned by `user_id`.
    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID.
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Note>;

    /// List notes, newest first.
    async fn list(&self, user_id: Uuid, req: ListNotesRequest) -> Result<Vec<Note>>;

    /// Update title, content, and/or tags.
    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Update the canvas position.
    async fn update_position(&self, user_id: Uuid, id: Uuid, x: f64, y: f64) -> Result<()>;

    /// Delete a note and every link touching it.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

// =============================================================================
// LINK REPOSITORY
// =============================================================================

/// Repository for directed note-to-note links.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Create a directed link between two notes owned by `user_id`.
    async fn link(&self, user_id: Uuid, from: Uuid, to: Uuid) -> Result<()>;

    /// Remove a directed link between two notes owned by `user_id`.
    async fn unlink(&self, user_id: Uuid, from: Uuid, to: Uuid) -> Result<()>;

    /// Assemble the graph view for a user's notes.
    async fn graph(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
        edge_scope: EdgeScope,
    ) -> Result<Graph>;
}

// =============================================================================
// PROJECT REPOSITORY
// =============================================================================

/// Repository for project management.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Create a project owned by `user_id`.
    async fn insert(&self, user_id: Uuid, name: &str) -> Result<Project>;

    /// List projects, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>>;

    /// Delete a project, its notes, and their links.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Request for provisioning a user row.
///
/// `password_hash` is produced by the identity collaborator and stored as-is.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Repository for user rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user row. Duplicate email is a Conflict.
    async fn insert(&self, req: CreateUserRequest) -> Result<User>;

    /// Fetch a user by ID.
    async fn fetch(&self, id: Uuid) -> Result<User>;

    /// Fetch a user by email.
    async fn fetch_by_email(&self, email: &str) -> Result<User>;
}

// =============================================================================
// DOCUMENT CODEC
// =============================================================================

/// Converts between note content and PDF/DOCX byte streams.
#[async_trait]
pub trait DocumentCodec: Send + Sync {
    /// Extract plain text from an uploaded document.
    async fn extract_text(&self, data: &[u8], format: DocumentFormat) -> Result<String>;

    /// Render a note (title, content, tags) to a document byte stream.
    async fn render(
        &self,
        title: &str,
        content: &str,
        tags: &[String],
        format: DocumentFormat,
    ) -> Result<Vec<u8>>;

    /// Whether the external tool required for `format` is available.
    async fn health_check(&self, format: DocumentFormat) -> Result<bool>;
}
