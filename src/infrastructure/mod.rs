//! Infrastructure layer: concrete storage behind the repository port.

pub mod persistence;
