//! Role name constants shared between seeding, auth claims, and handlers.

/// Full administrative access, including other users' jobs.
pub const ROLE_ADMIN: &str = "admin";

/// Regular operator: manages providers and their own migration jobs.
pub const ROLE_OPERATOR: &str = "operator";
