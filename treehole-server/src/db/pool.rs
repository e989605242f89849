//! Database connection pool management
//!
//! Uses sqlx SqlitePool with explicit connection limits. Each repository call
//! borrows one connection for a single statement (or one transaction) and
//! hands it back on every exit path.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::DbError;

/// Default maximum connections for the pool.
/// Kept low: SQLite serializes writers anyway.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open (creating if needed) the SQLite database at `path`.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`DbError::Unavailable`] if the file can't be created or opened.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("data/messages.db").await?;
/// ```
pub async fn create_pool(path: impl AsRef<Path>) -> Result<SqlitePool, DbError> {
    create_pool_with_options(path, DEFAULT_MAX_CONNECTIONS).await
}

/// Open the SQLite database with a custom connection limit.
pub async fn create_pool_with_options(
    path: impl AsRef<Path>,
    max_connections: u32,
) -> Result<SqlitePool, DbError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DbError::unavailable(sqlx::Error::Io(e)))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(DbError::unavailable)?;

    tracing::debug!(path = %path.display(), max_connections, "sqlite pool opened");
    Ok(pool)
}

/// Fresh, initialized database in a temp dir. Keep the `TempDir` alive.
#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = create_pool(dir.path().join("messages.db"))
        .await
        .expect("pool creation failed");
    super::schema::create_schema(&pool)
        .await
        .expect("schema creation failed");
    (dir, pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_creates_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("messages.db");

        let pool = create_pool(&path).await.expect("pool creation failed");
        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn unopenable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where a directory is expected
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let err = create_pool(blocker.join("messages.db")).await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)));
    }

    #[tokio::test]
    async fn concurrent_pool_access() {
        let (_dir, pool) = test_pool().await;

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let result: (i64,) = sqlx::query_as("SELECT ?")
                        .bind(i as i64)
                        .fetch_one(&pool)
                        .await
                        .expect("concurrent query failed");
                    result.0
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.expect("task panicked");
            assert_eq!(result, i as i64);
        }
    }
}
