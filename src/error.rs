//! Error taxonomy shared by the engine, its storage backends and the CLI.

use thiserror::Error;

/// Errors produced by link operations.
///
/// Input errors ([`AppError::InvalidLength`], [`AppError::InvalidUrl`]) are
/// surfaced to the caller directly and never retried. Storage failures are
/// passed through as [`AppError::StorageUnavailable`] without retry.
#[derive(Debug, Error)]
pub enum AppError {
    /// A code of length zero was requested.
    #[error("code length must be greater than zero")]
    InvalidLength,

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The adaptive code length grew past the configured maximum.
    #[error("code length exceeded the maximum of {max_length}")]
    LengthExceeded { max_length: usize },

    #[error("short link {code:?} not found")]
    NotFound { code: String },

    /// The backend refused a row because its code already belongs to another target.
    #[error("short code {code:?} is already assigned")]
    CodeConflict { code: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl AppError {
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    /// Returns true for errors caused by caller input rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLength | Self::InvalidUrl { .. } | Self::NotFound { .. }
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e, None)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::StorageUnavailable(format!("I/O error: {e}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::StorageUnavailable(format!("log encoding error: {e}"))
    }
}

/// Maps a sqlx error, turning unique violations on the code column into
/// [`AppError::CodeConflict`] when the offending code is known.
pub fn map_sqlx_error(e: sqlx::Error, code: Option<&str>) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
        && let Some(code) = code
    {
        return AppError::CodeConflict {
            code: code.to_string(),
        };
    }

    AppError::StorageUnavailable(format!("database error: {e}"))
}
