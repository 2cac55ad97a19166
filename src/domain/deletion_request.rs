//! Deletion request model for the asynchronous deletion pipeline.

use serde::{Deserialize, Serialize};

/// A request to soft-delete one code on behalf of its owner.
///
/// Lives only in the pipeline's channel and the in-flight batch; it is never
/// stored on its own. Applying it flips [`crate::domain::entities::Link::deleted`]
/// when both the code and the owner match.
///
/// # Usage Flow
///
/// 1. Created by [`crate::application::services::LinkService::request_delete`]
/// 2. Sent to the bounded pipeline channel
/// 3. Batched by [`crate::domain::deletion_worker::run_deletion_worker`]
/// 4. Applied via [`crate::domain::repositories::LinkRepository::mark_deleted`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeletionRequest {
    pub code: String,
    pub owner_id: u64,
}

impl DeletionRequest {
    pub fn new(code: impl Into<String>, owner_id: u64) -> Self {
        Self {
            code: code.into(),
            owner_id,
        }
    }
}
