//! Project repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notegraph_core::{new_v7, Error, Project, ProjectRepository, Result};

/// PostgreSQL implementation of ProjectRepository.
pub struct PgProjectRepository {
    pool: Pool<Postgres>,
}

fn map_row_to_project(row: sqlx::postgres::PgRow) -> Project {
    Project {
        id: row.get("id"),
        name: row.get("name"),
        user_id: row.get("user_id"),
        created_at_utc: row.get("created_at_utc"),
    }
}

impl PgProjectRepository {
    /// Create a new PgProjectRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn insert(&self, user_id: Uuid, name: &str) -> Result<Project> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Project name is required".to_string()));
        }

        let row = sqlx::query(
            "INSERT INTO projects (id, name, user_id, created_at_utc)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, user_id, created_at_utc",
        )
        .bind(new_v7())
        .bind(trimmed)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_project(row))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>> {
        let rows = sqlx::query(
            "SELECT id, name, user_id, created_at_utc
             FROM projects WHERE user_id = $1
             ORDER BY created_at_utc DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_project).collect())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Collect the project's note ids first; the whole cascade runs in
        // one transaction, links before notes before the project row.
        let note_rows = sqlx::query("SELECT id FROM notes WHERE project_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let note_ids: Vec<Uuid> = note_rows.into_iter().map(|r| r.get("id")).collect();

        if !note_ids.is_empty() {
            sqlx::query(
                "DELETE FROM note_links WHERE from_note_id = ANY($1) OR to_note_id = ANY($1)",
            )
            .bind(&note_ids)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            sqlx::query("DELETE FROM notes WHERE id = ANY($1)")
                .bind(&note_ids)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ProjectNotFound(id));
        }

        tx.commit().await.map_err(Error::Database)?;

        tracing::info!(
            subsystem = "db",
            component = "projects",
            op = "delete",
            user_id = %user_id,
            project_id = %id,
            note_count = note_ids.len(),
            "Project cascade delete complete"
        );
        Ok(())
    }
}
