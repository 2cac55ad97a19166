//! Repository trait for short link data access.

use crate::domain::deletion_request::DeletionRequest;
use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage port consumed by [`crate::application::services::LinkService`].
///
/// Implementations are the single source of truth for deduplication by
/// target: create-or-fetch never creates a second code for a known target.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-memory with append-only log
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Stores `new_link`, or returns the existing link when its target is
    /// already known. The existing link keeps its original code and owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeConflict`] if the candidate code already
    /// belongs to a different target.
    /// Returns [`AppError::StorageUnavailable`] on backend errors.
    async fn get_or_create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on backend errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Checks whether a code has ever been assigned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on backend errors.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Batch form of [`LinkRepository::get_or_create`] applied as one unit.
    ///
    /// Returns one link per distinct target. Rows whose target already exists
    /// come back with their stored code and owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeConflict`] or [`AppError::StorageUnavailable`];
    /// on error nothing from the batch is stored.
    async fn get_or_create_many(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError>;

    /// Lists every link created by `owner_id`, including deleted ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on backend errors.
    async fn list_by_owner(&self, owner_id: u64) -> Result<Vec<Link>, AppError>;

    /// Marks links as deleted. A request only applies when both its code and
    /// its owner match a stored link; other requests are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on backend errors.
    async fn mark_deleted(&self, requests: Vec<DeletionRequest>) -> Result<(), AppError>;

    /// Counts stored links, deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on backend errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Checks that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] when it is not.
    async fn ping(&self) -> Result<(), AppError>;
}
