//! Row structs and request DTOs.

pub mod job;
pub mod job_log;
pub mod provider;
pub mod status;
pub mod system_event;
pub mod user;
pub mod virtual_machine;

pub use job::{Job, JobListQuery, NewJob};
pub use job_log::JobLogEntry;
pub use provider::{NewProvider, Provider};
pub use status::{JobStatus, ProviderKind, StatusId};
pub use system_event::SystemEvent;
pub use user::User;
pub use virtual_machine::{DiscoveredVm, VirtualMachine};
