use crate::domain::error::{AppError, InsertError, Result};
use crate::domain::user::{User, UserRecord};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const USERS_SCHEMA: &str = include_str!("../../../resources/users/schema.sql");

/// Persistence boundary for validated user records.
///
/// The store owns the uniqueness constraint on email: a second insert of the
/// same address fails with `InsertError::DuplicateEmail`. Every other failure
/// is `InsertError::Database` and is fatal to the caller.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, record: &UserRecord) -> std::result::Result<i64, InsertError>;
}

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let db_url = db_path_to_url(db_path)?;
        let options = SqliteConnectOptions::from_str(&db_url)
            .map_err(|e| AppError::DatabaseError(format!("Failed to parse users DB URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect users DB: {e}")))?;

        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection that never expires,
    /// since every new connection to `sqlite::memory:` is a fresh database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::DatabaseError(format!("Failed to parse users DB URL: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to open in-memory users DB: {e}")))?;

        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT id, name, email, age, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user: {e}")))?;

        match user {
            Some(user) => Ok(user.into()),
            None => Err(AppError::NotFound(format!("User not found: {}", email))),
        }
    }

    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, UserEntity>(
            "SELECT id, name, email, age, created_at FROM users ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list users: {e}")))?;

        Ok(users.into_iter().map(|user| user.into()).collect())
    }

    pub async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count users: {e}")))
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Users database health check failed: {e}")))?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, record: &UserRecord) -> std::result::Result<i64, InsertError> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, age, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(record.name())
        .bind(record.email())
        .bind(record.age())
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                InsertError::DuplicateEmail
            }
            other => InsertError::Database(format!("Failed to insert user: {other}")),
        })?;

        Ok(result.last_insert_rowid())
    }
}

fn db_path_to_url(db_path: &Path) -> Result<String> {
    let db_path_str = db_path.to_str().ok_or_else(|| {
        AppError::DatabaseError("Users database path is not valid UTF-8".to_string())
    })?;
    Ok(format!("sqlite://{}", db_path_str.replace("\\", "/")))
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in USERS_SCHEMA.split(';') {
        let stmt = statement.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply users schema: {e}")))?;
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct UserEntity {
    id: i64,
    name: String,
    email: String,
    age: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            age: entity.age,
            created_at: entity.created_at,
        }
    }
}
