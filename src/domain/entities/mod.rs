//! Core domain entities.
//!
//! - [`Link`] - A stored code to target mapping
//! - [`NewLink`] - Input for create-or-fetch
//! - [`BatchItem`] / [`BatchResult`] - Rows of a batch shorten call

pub mod batch;
pub mod link;

pub use batch::{BatchItem, BatchResult};
pub use link::{Link, NewLink};
