//! Shared primitives for the vmshift workspace.
//!
//! Keeps the cross-crate vocabulary small: id/timestamp aliases, the
//! domain error enum, and role name constants.

pub mod error;
pub mod roles;
pub mod types;

pub use error::CoreError;
