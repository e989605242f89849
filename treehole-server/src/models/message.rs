//! Message input validation
//!
//! Lengths are counted in characters, not bytes, so CJK content gets the
//! same allowance as ASCII.

use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Maximum length for message content
pub const MAX_CONTENT_LEN: usize = 200;

/// Maximum length for a nickname
pub const MAX_NICKNAME_LEN: usize = 20;

/// Nickname stored when none (or an unusable one) is supplied
pub const DEFAULT_NICKNAME: &str = "anonymous";

/// Validated, trimmed message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create message content from raw input.
    ///
    /// # Rules
    /// - Leading and trailing whitespace is removed
    /// - Must be non-empty after trimming
    /// - Max 200 characters after trimming
    ///
    /// # Example
    /// ```
    /// use treehole_server::models::MessageContent;
    ///
    /// assert_eq!(MessageContent::new("  hello ").unwrap().as_str(), "hello");
    /// assert!(MessageContent::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "message content",
            });
        }

        if trimmed.chars().count() > MAX_CONTENT_LEN {
            return Err(ValidationError::TooLong {
                field: "message content",
                max: MAX_CONTENT_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trimmed nickname, or the default sentinel.
///
/// Nicknames are never rejected: anything missing, blank or too long is
/// coerced to [`DEFAULT_NICKNAME`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(String);

impl Nickname {
    pub fn from_input(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            Some(s) if !s.is_empty() && s.chars().count() <= MAX_NICKNAME_LEN => {
                Self(s.to_owned())
            }
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_NICKNAME
    }
}

impl Default for Nickname {
    fn default() -> Self {
        Self(DEFAULT_NICKNAME.to_owned())
    }
}

/// Positive message identifier parsed from a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(Self::invalid());
        }
        Ok(Self(id))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    fn invalid() -> ValidationError {
        ValidationError::InvalidFormat {
            field: "message id",
            reason: "must be a positive integer",
        }
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: i64 = s.trim().parse().map_err(|_| Self::invalid())?;
        Self::new(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
