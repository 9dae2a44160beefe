//! Request handlers, one module per resource.

pub mod auth;
pub mod health;
pub mod jobs;
pub mod providers;
pub mod system_events;
