//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use notegraph_core::defaults::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use notegraph_core::{
    new_v7, normalize_tags, CreateNoteRequest, Error, ListNotesRequest, Note, NoteRepository,
    Result, UpdateNoteRequest,
};

/// PostgreSQL implementation of NoteRepository.
///
/// Every statement is filtered by the owning user; a note owned by someone
/// else is indistinguishable from a note that does not exist.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

/// Map a database row to a Note.
pub(crate) fn map_row_to_note(row: sqlx::postgres::PgRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        user_id: row.get("user_id"),
        project_id: row.get("project_id"),
        tags: row.get("tags"),
        x: row.get("x"),
        y: row.get("y"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

/// Validate a note title: non-empty after trimming.
fn validate_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    Ok(trimmed)
}

/// Clamp a requested list limit to the allowed range.
fn effective_limit(requested: Option<i64>) -> i64 {
    requested
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT)
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch a note inside an existing transaction.
    pub async fn fetch_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Note> {
        let row = sqlx::query(
            "SELECT id, title, content, user_id, project_id, tags, x, y,
                    created_at_utc, updated_at_utc
             FROM notes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_note).ok_or(Error::NoteNotFound(id))
    }

    /// Delete a note and every link touching it, inside an existing
    /// transaction. Links go first.
    pub async fn delete_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<()> {
        // Ownership check inside the transaction
        self.fetch_tx(tx, user_id, id).await?;

        sqlx::query("DELETE FROM note_links WHERE from_note_id = $1 OR to_note_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    /// Insert a note inside an existing transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        req: CreateNoteRequest,
    ) -> Result<Note> {
        let title = validate_title(&req.title)?.to_string();
        let tags = normalize_tags(req.tags.unwrap_or_default());
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(
            "INSERT INTO notes (id, title, content, user_id, project_id, tags,
                                created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING id, title, content, user_id, project_id, tags, x, y,
                       created_at_utc, updated_at_utc",
        )
        .bind(id)
        .bind(&title)
        .bind(&req.content)
        .bind(user_id)
        .bind(req.project_id)
        .bind(&tags)
        .bind(now)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_note(row))
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.insert_tx(&mut tx, user_id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        tracing::debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            user_id = %user_id,
            note_id = %note.id,
            "Note created"
        );
        Ok(note)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Note> {
        let row = sqlx::query(
            "SELECT id, title, content, user_id, project_id, tags, x, y,
                    created_at_utc, updated_at_utc
             FROM notes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_note).ok_or(Error::NoteNotFound(id))
    }

    async fn list(&self, user_id: Uuid, req: ListNotesRequest) -> Result<Vec<Note>> {
        let limit = effective_limit(req.limit);
        let offset = req.offset.filter(|o| *o >= 0).unwrap_or(0);

        let rows = if let Some(project_id) = req.project_id {
            sqlx::query(
                "SELECT id, title, content, user_id, project_id, tags, x, y,
                        created_at_utc, updated_at_utc
                 FROM notes WHERE user_id = $1 AND project_id = $2
                 ORDER BY created_at_utc DESC
                 LIMIT $3 OFFSET $4",
            )
            .bind(user_id)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                "SELECT id, title, content, user_id, project_id, tags, x, y,
                        created_at_utc, updated_at_utc
                 FROM notes WHERE user_id = $1
                 ORDER BY created_at_utc DESC
                 LIMIT $2 OFFSET $3",
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Ownership check and current values, both inside the transaction
        let current = self.fetch_tx(&mut tx, user_id, id).await?;

        let title = match &req.title {
            Some(t) => validate_title(t)?.to_string(),
            None => current.title,
        };
        let content = req.content.or(current.content);
        let tags = match req.tags {
            Some(raw) => normalize_tags(raw),
            None => current.tags,
        };
        let now = Utc::now();

        let row = sqlx::query(
            "UPDATE notes SET title = $1, content = $2, tags = $3, updated_at_utc = $4
             WHERE id = $5 AND user_id = $6
             RETURNING id, title, content, user_id, project_id, tags, x, y,
                       created_at_utc, updated_at_utc",
        )
        .bind(&title)
        .bind(&content)
        .bind(&tags)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(map_row_to_note(row))
    }

    async fn update_position(&self, user_id: Uuid, id: Uuid, x: f64, y: f64) -> Result<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidInput(
                "Position coordinates must be finite numbers".to_string(),
            ));
        }

        let result = sqlx::query(
            "UPDATE notes SET x = $1, y = $2, updated_at_utc = $3
             WHERE id = $4 AND user_id = $5",
        )
        .bind(x)
        .bind(y)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.delete_tx(&mut tx, user_id, id).await?;
        tx.commit().await.map_err(Error::Database)?;

        tracing::debug!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            user_id = %user_id,
            note_id = %id,
            "Note and its links deleted"
        );
        Ok(())
    }
}
