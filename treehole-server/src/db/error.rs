//! Storage error type

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The database file or pool could not be opened or reached
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A write statement failed
    #[error("storage write failed: {0}")]
    Write(#[source] sqlx::Error),

    /// A read statement failed
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    /// Classify a failed write. Connection-level failures stay `Unavailable`.
    pub(crate) fn write(e: sqlx::Error) -> Self {
        if is_unavailable(&e) {
            Self::Unavailable(e)
        } else {
            Self::Write(e)
        }
    }

    /// Classify a failure while opening or bootstrapping the store.
    pub(crate) fn unavailable(e: sqlx::Error) -> Self {
        Self::Unavailable(e)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn is_unavailable(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_keeps_pool_failures_unavailable() {
        assert!(matches!(
            DbError::write(sqlx::Error::PoolClosed),
            DbError::Unavailable(_)
        ));
        assert!(matches!(
            DbError::write(sqlx::Error::RowNotFound),
            DbError::Write(_)
        ));
    }

    #[test]
    fn not_found_display() {
        let err = DbError::NotFound {
            resource: "message",
            id: "7".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: message '7'");
    }
}
