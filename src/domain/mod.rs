//! Domain layer containing business entities and the deletion pipeline.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Storage port definition
//! - [`deletion_request`] - Ephemeral soft-delete request
//! - [`deletion_worker`] - Batched background deletion
//!
//! # Deletion Flow
//!
//! 1. A caller asks [`crate::application::services::LinkService`] to delete codes
//! 2. One [`deletion_request::DeletionRequest`] per code is sent to a bounded channel
//! 3. [`deletion_worker::run_deletion_worker`] batches them and flushes on an interval
//! 4. The batch is applied via [`repositories::LinkRepository::mark_deleted`]

pub mod deletion_request;
pub mod deletion_worker;
pub mod entities;
pub mod repositories;
