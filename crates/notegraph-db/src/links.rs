//! Link repository: directed note-to-note edges and graph assembly.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use notegraph_core::{
    new_v7, EdgeScope, Error, Graph, GraphLink, GraphNode, LinkRepository, Result,
};

/// PostgreSQL implementation of LinkRepository.
pub struct PgLinkRepository {
    pool: Pool<Postgres>,
}

impl PgLinkRepository {
    /// Create a new PgLinkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Verify both endpoints exist and are owned by `user_id`, inside the
    /// enclosing transaction. Missing and not-owned collapse to NotFound.
    async fn check_endpoints_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        from: Uuid,
        to: Uuid,
    ) -> Result<()> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS owned FROM notes WHERE id = ANY($1) AND user_id = $2",
        )
        .bind(vec![from, to])
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let owned: i64 = row.get("owned");
        if owned != 2 {
            return Err(Error::NotFound(
                "One or both notes not found".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn link(&self, user_id: Uuid, from: Uuid, to: Uuid) -> Result<()> {
        if from == to {
            return Err(Error::InvalidInput(
                "Cannot link a note to itself".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        self.check_endpoints_tx(&mut tx, user_id, from, to).await?;

        let existing =
            sqlx::query("SELECT 1 FROM note_links WHERE from_note_id = $1 AND to_note_id = $2")
                .bind(from)
                .bind(to)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if existing.is_some() {
            return Err(Error::Conflict("Link already exists".to_string()));
        }

        // The unique index on (from_note_id, to_note_id) backs this check
        // under concurrent inserts; surface a violation as the same Conflict.
        let inserted = sqlx::query(
            "INSERT INTO note_links (id, from_note_id, to_note_id, created_at_utc)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(new_v7())
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) => {
                let is_duplicate = e
                    .as_database_error()
                    .map(|d| d.is_unique_violation())
                    .unwrap_or(false);
                if is_duplicate {
                    return Err(Error::Conflict("Link already exists".to_string()));
                }
                return Err(Error::Database(e));
            }
        }

        tx.commit().await.map_err(Error::Database)?;

        tracing::debug!(
            subsystem = "db",
            component = "links",
            op = "link",
            user_id = %user_id,
            from_note_id = %from,
            to_note_id = %to,
            "Link created"
        );
        Ok(())
    }

    async fn unlink(&self, user_id: Uuid, from: Uuid, to: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        self.check_endpoints_tx(&mut tx, user_id, from, to).await?;

        let result =
            sqlx::query("DELETE FROM note_links WHERE from_note_id = $1 AND to_note_id = $2")
                .bind(from)
                .bind(to)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Link not found".to_string()));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn graph(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
        edge_scope: EdgeScope,
    ) -> Result<Graph> {
        let node_rows = if let Some(project_id) = project_id {
            sqlx::query(
                "SELECT id, title, x, y FROM notes
                 WHERE user_id = $1 AND project_id = $2
                 ORDER BY created_at_utc DESC",
            )
            .bind(user_id)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                "SELECT id, title, x, y FROM notes
                 WHERE user_id = $1
                 ORDER BY created_at_utc DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(Error::Database)?;

        let nodes: Vec<GraphNode> = node_rows
            .into_iter()
            .map(|row| GraphNode {
                id: row.get("id"),
                title: row.get("title"),
                x: row.get("x"),
                y: row.get("y"),
            })
            .collect();

        let node_ids: Vec<Uuid> = nodes.iter().map(|n| n.id).collect();
        if node_ids.is_empty() {
            return Ok(Graph {
                nodes,
                links: Vec::new(),
            });
        }

        let link_rows = match edge_scope {
            EdgeScope::Either => {
                sqlx::query(
                    "SELECT from_note_id, to_note_id FROM note_links
                     WHERE from_note_id = ANY($1) OR to_note_id = ANY($1)",
                )
                .bind(&node_ids)
                .fetch_all(&self.pool)
                .await
            }
            EdgeScope::Both => {
                sqlx::query(
                    "SELECT from_note_id, to_note_id FROM note_links
                     WHERE from_note_id = ANY($1) AND to_note_id = ANY($1)",
                )
                .bind(&node_ids)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        let links: Vec<GraphLink> = link_rows
            .into_iter()
            .map(|row| GraphLink {
                from_note_id: row.get("from_note_id"),
                to_note_id: row.get("to_note_id"),
            })
            .collect();

        tracing::debug!(
            subsystem = "db",
            component = "links",
            op = "graph",
            user_id = %user_id,
            result_count = nodes.len(),
            "Graph assembled"
        );

        Ok(Graph { nodes, links })
    }
}
