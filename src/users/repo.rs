use axum::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{Role, User, UserChanges};

// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Driver-level error code, if the database reported one.
    pub fn code(&self) -> Option<String> {
        match self {
            StoreError::EmailTaken => Some(UNIQUE_VIOLATION.to_string()),
            StoreError::Database(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
            StoreError::Database(_) => None,
        }
    }
}

/// Persistence for the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// All users, newest id first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn insert(&self, email: &str, password_hash: &str, role: Role) -> Result<User, StoreError>;
    /// Returns `false` when no row has this id.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<bool, StoreError>;
    /// Returns `false` when no row has this id.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
    async fn ping(&self) -> Result<i32, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_unique(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::EmailTaken
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, email: &str, password_hash: &str, role: Role) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<bool, StoreError> {
        let result = match &changes.password_hash {
            Some(hash) => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET email = $1, password_hash = $2, role = $3
                    WHERE id = $4
                    "#,
                )
                .bind(&changes.email)
                .bind(hash)
                .bind(changes.role)
                .bind(id)
                .execute(&self.db)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET email = $1, role = $2
                    WHERE id = $3
                    "#,
                )
                .bind(&changes.email)
                .bind(changes.role)
                .bind(id)
                .execute(&self.db)
                .await
            }
        }
        .map_err(map_unique)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<i32, StoreError> {
        let (ok,) = sqlx::query_as::<_, (i32,)>("SELECT 1 AS ok")
            .fetch_one(&self.db)
            .await?;
        Ok(ok)
    }
}
