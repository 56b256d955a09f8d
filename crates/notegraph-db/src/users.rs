//! User repository implementation.
//!
//! Rows are provisioned by the upstream identity service; this repository
//! never hashes or verifies passwords.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notegraph_core::{new_v7, CreateUserRequest, Error, Result, User, UserRepository};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

fn map_row_to_user(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at_utc: row.get("created_at_utc"),
    }
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, req: CreateUserRequest) -> Result<User> {
        let name = req.name.trim();
        let email = req.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::InvalidInput("Name is required".to_string()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(Error::InvalidInput("A valid email is required".to_string()));
        }
        if req.password_hash.is_empty() {
            return Err(Error::InvalidInput("Password hash is required".to_string()));
        }

        let inserted = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, password_hash, created_at_utc",
        )
        .bind(new_v7())
        .bind(name)
        .bind(&email)
        .bind(&req.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(map_row_to_user(row)),
            Err(e) => {
                let is_duplicate = e
                    .as_database_error()
                    .map(|d| d.is_unique_violation())
                    .unwrap_or(false);
                if is_duplicate {
                    return Err(Error::Conflict("Email already registered".to_string()));
                }
                Err(Error::Database(e))
            }
        }
    }

    async fn fetch(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at_utc FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_user)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))
    }

    async fn fetch_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at_utc
             FROM users WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_user)
            .ok_or_else(|| Error::NotFound(format!("User with email {} not found", email)))
    }
}
