//! Application layer services implementing business logic.
//!
//! Services consume the repository port and provide the API that transport
//! adapters and the CLI call into.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Code allocation, get-or-create, resolution and deletion

pub mod services;
