//! Message repository
//!
//! Every operation is a single statement against the pool. Writes that need
//! the resulting row use `RETURNING` so the read-back is part of the same
//! atomic statement.

use chrono::{DateTime, Local, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::db::DbError;
use crate::models::{MessageContent, MessageId, Nickname};

/// Display format for message timestamps (server local time)
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Message record from database.
///
/// `ip_address` is never selected, so it can't leak through a read.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub nickname: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creation time rendered in the server's local time zone.
    pub fn local_time(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format(TIME_FORMAT)
            .to_string()
    }
}

/// Message repository
pub struct MessageRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All messages, newest first.
    ///
    /// `id DESC` breaks ties between rows created in the same millisecond.
    pub async fn list_all(&self) -> Result<Vec<Message>, DbError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, content, COALESCE(nickname, 'anonymous') AS nickname, likes, created_at
            FROM messages
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Insert a message with zero likes and the current timestamp.
    pub async fn insert(
        &self,
        content: &MessageContent,
        nickname: &Nickname,
        ip_address: Option<&str>,
    ) -> Result<Message, DbError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (content, nickname, ip_address)
            VALUES (?, ?, ?)
            RETURNING id, content, COALESCE(nickname, 'anonymous') AS nickname, likes, created_at
            "#,
        )
        .bind(content.as_str())
        .bind(nickname.as_str())
        .bind(ip_address)
        .fetch_one(self.pool)
        .await
        .map_err(DbError::write)?;

        Ok(message)
    }

    /// Fetch a single message. Absence is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, id: MessageId) -> Result<Option<Message>, DbError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, content, COALESCE(nickname, 'anonymous') AS nickname, likes, created_at
            FROM messages
            WHERE id = ?
            "#,
        )
        .bind(id.get())
        .fetch_optional(self.pool)
        .await?;

        Ok(message)
    }

    /// Permanently remove a message. Returns whether a row was removed.
    pub async fn delete(&self, id: MessageId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.get())
            .execute(self.pool)
            .await
            .map_err(DbError::write)?;

        Ok(result.rows_affected() > 0)
    }

    /// Add one like and return the updated row.
    ///
    /// Increment and read-back are one statement, so concurrent likes can't
    /// lose updates and a concurrently deleted row surfaces as `NotFound`.
    pub async fn increment_likes(&self, id: MessageId) -> Result<Message, DbError> {
        sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages
            SET likes = likes + 1
            WHERE id = ?
            RETURNING id, content, COALESCE(nickname, 'anonymous') AS nickname, likes, created_at
            "#,
        )
        .bind(id.get())
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::write)?
        .ok_or_else(|| DbError::NotFound {
            resource: "message",
            id: id.to_string(),
        })
    }

    /// Total number of stored messages.
    pub async fn count(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;

    fn content(s: &str) -> MessageContent {
        MessageContent::new(s).unwrap()
    }

    fn id(n: i64) -> MessageId {
        MessageId::new(n).unwrap()
    }

    #[tokio::test]
    async fn insert_then_get() {
        let (_dir, pool) = test_pool().await;
        let repo = MessageRepo::new(&pool);

        let created = repo
            .insert(&content("hello"), &Nickname::from_input(Some("alice")), Some("10.0.0.1"))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.content, "hello");
        assert_eq!(created.nickname, "alice");
        assert_eq!(created.likes, 0);

        let fetched = repo.get_by_id(id(created.id)).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.content, "hello");
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let (_dir, pool) = test_pool().await;
        let repo = MessageRepo::new(&pool);

        assert!(repo.get_by_id(id(999_999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_empty_store() {
        let (_dir, pool) = test_pool().await;
        let messages = MessageRepo::new(&pool).list_all().await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn list_is_reverse_insertion_order() {
        let (_dir, pool) = test_pool().await;
        let repo = MessageRepo::new(&pool);

        let mut ids = Vec::new();
        for i in 0..5 {
            let m = repo
                .insert(&content(&format!("message {}", i)), &Nickname::default(), None)
                .await
                .unwrap();
            ids.push(m.id);
        }

        let listed: Vec<i64> = repo.list_all().await.unwrap().iter().map(|m| m.id).collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn likes_accumulate() {
        let (_dir, pool) = test_pool().await;
        let repo = MessageRepo::new(&pool);
        let m = repo.insert(&content("like me"), &Nickname::default(), None).await.unwrap();

        let mut last = 0;
        for _ in 0..4 {
            let updated = repo.increment_likes(id(m.id)).await.unwrap();
            assert!(updated.likes > last);
            last = updated.likes;
        }

        assert_eq!(last, 4);
        assert_eq!(repo.get_by_id(id(m.id)).await.unwrap().unwrap().likes, 4);
    }

    #[tokio::test]
    async fn concurrent_likes_are_not_lost() {
        let (_dir, pool) = test_pool().await;
        let m = MessageRepo::new(&pool)
            .insert(&content("popular"), &Nickname::default(), None)
            .await
            .unwrap();
        let message_id = m.id;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    MessageRepo::new(&pool)
                        .increment_likes(MessageId::new(message_id).unwrap())
                        .await
                        .expect("like failed")
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("task panicked");
        }

        let stored = MessageRepo::new(&pool).get_by_id(id(message_id)).await.unwrap().unwrap();
        assert_eq!(stored.likes, 20);
    }

    #[tokio::test]
    async fn like_missing_is_not_found() {
        let (_dir, pool) = test_pool().await;
        let err = MessageRepo::new(&pool).increment_likes(id(999_999)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_reports_whether_row_removed() {
        let (_dir, pool) = test_pool().await;
        let repo = MessageRepo::new(&pool);
        let m = repo.insert(&content("bye"), &Nickname::default(), None).await.unwrap();

        assert!(repo.delete(id(m.id)).await.unwrap());
        assert!(!repo.delete(id(m.id)).await.unwrap());
        assert!(repo.get_by_id(id(m.id)).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn like_after_delete_is_not_found() {
        let (_dir, pool) = test_pool().await;
        let repo = MessageRepo::new(&pool);
        let m = repo.insert(&content("gone"), &Nickname::default(), None).await.unwrap();

        repo.delete(id(m.id)).await.unwrap();
        assert!(repo.increment_likes(id(m.id)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn ip_address_is_stored() {
        let (_dir, pool) = test_pool().await;
        let m = MessageRepo::new(&pool)
            .insert(&content("traced"), &Nickname::default(), Some("192.168.1.20"))
            .await
            .unwrap();

        let (ip,): (Option<String>,) = sqlx::query_as("SELECT ip_address FROM messages WHERE id = ?")
            .bind(m.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(ip.as_deref(), Some("192.168.1.20"));
    }

    #[tokio::test]
    async fn local_time_format() {
        let (_dir, pool) = test_pool().await;
        let m = MessageRepo::new(&pool)
            .insert(&content("when"), &Nickname::default(), None)
            .await
            .unwrap();

        let time = m.local_time();
        assert!(chrono::NaiveDateTime::parse_from_str(&time, TIME_FORMAT).is_ok());
    }
}
