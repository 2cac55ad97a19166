//! Repository implementations.
//!
//! # Repositories
//!
//! - [`MemoryLinkRepository`] - Process-local storage with an optional append-only log
//! - [`PgLinkRepository`] - PostgreSQL storage via SQLx

pub mod link_log;
pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
