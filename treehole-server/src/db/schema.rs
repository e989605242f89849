//! Schema bootstrap and sample data

use sqlx::SqlitePool;

use super::DbError;

/// Single table; `created_at` keeps millisecond precision so the feed order
/// is stable for messages posted in the same second.
const CREATE_MESSAGES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        nickname TEXT DEFAULT 'anonymous',
        likes INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
        ip_address TEXT
    )
"#;

/// Seeded into an empty board: (content, nickname)
pub const SAMPLE_MESSAGES: &[(&str, &str)] = &[
    ("This course finally has a real project, kind of excited!", "study-buddy"),
    ("The braised pork in the canteen is great today, go try it.", "foodie"),
    ("Rust + SQLite is a really nice combo for small projects!", "tech-nerd"),
    ("Does anyone know when the final exam is?", "exam-anxiety"),
];

/// Create the messages table if it doesn't exist.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query(CREATE_MESSAGES_TABLE)
        .execute(pool)
        .await
        .map_err(DbError::unavailable)?;
    Ok(())
}

/// Ensure the schema exists and seed sample messages into an empty table.
///
/// Safe to call on every startup: seeding only happens when the table has
/// no rows. Returns how many rows were seeded.
pub async fn initialize(pool: &SqlitePool) -> Result<usize, DbError> {
    tracing::info!("Initializing message store...");
    create_schema(pool).await?;

    let mut tx = pool.begin().await.map_err(DbError::unavailable)?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::unavailable)?;

    if count > 0 {
        tracing::info!(count, "store already has messages, skipping sample data");
        return Ok(0);
    }

    for (content, nickname) in SAMPLE_MESSAGES {
        sqlx::query("INSERT INTO messages (content, nickname) VALUES (?, ?)")
            .bind(*content)
            .bind(*nickname)
            .execute(&mut *tx)
            .await
            .map_err(DbError::unavailable)?;
    }

    tx.commit().await.map_err(DbError::unavailable)?;

    tracing::info!(seeded = SAMPLE_MESSAGES.len(), "sample messages inserted");
    Ok(SAMPLE_MESSAGES.len())
}
