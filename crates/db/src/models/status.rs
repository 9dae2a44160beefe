//! Status and kind enums mapping to SMALLSERIAL lookup tables.
//!
//! Discriminants match the seed data order (1-based) in `job_statuses`
//! and `provider_kinds`.

/// Status/kind ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Migration job lifecycle status.
///
/// `Completed` and `Failed` are terminal: once a job reaches either, no
/// further status or progress mutation is permitted.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued = 1,
    Running = 2,
    Completed = 3,
    Failed = 4,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Queued),
            2 => Some(Self::Running),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Lowercase wire name, matching the lookup table seed row.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// True once no further status/progress mutation is permitted.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Terminal check on a raw status ID (for SQL guards and row structs).
    pub fn is_terminal_id(id: StatusId) -> bool {
        Self::from_id(id).is_some_and(Self::is_terminal)
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}

/// Registered provider platform kind.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Source virtualization platform (VMware vCenter).
    Vcenter = 1,
    /// Destination hypervisor cluster (Proxmox VE).
    Proxmox = 2,
}

impl ProviderKind {
    /// Return the database kind ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database kind ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Vcenter),
            2 => Some(Self::Proxmox),
            _ => None,
        }
    }

    /// Lowercase wire name, matching the lookup table seed row.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vcenter => "vcenter",
            Self::Proxmox => "proxmox",
        }
    }

    /// Parse the wire name used by the provider-registration API.
    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "vcenter" => Some(Self::Vcenter),
            "proxmox" => Some(Self::Proxmox),
            _ => None,
        }
    }
}

impl From<ProviderKind> for StatusId {
    fn from(value: ProviderKind) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_ids_match_seed_data() {
        assert_eq!(JobStatus::Queued.id(), 1);
        assert_eq!(JobStatus::Running.id(), 2);
        assert_eq!(JobStatus::Completed.id(), 3);
        assert_eq!(JobStatus::Failed.id(), 4);
    }

    #[test]
    fn job_status_round_trips_through_id() {
        for status in [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(JobStatus::from_id(0), None);
        assert_eq!(JobStatus::from_id(9), None);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::is_terminal_id(3));
        assert!(JobStatus::is_terminal_id(4));
        assert!(!JobStatus::is_terminal_id(2));
    }

    #[test]
    fn provider_kind_ids_match_seed_data() {
        assert_eq!(ProviderKind::Vcenter.id(), 1);
        assert_eq!(ProviderKind::Proxmox.id(), 2);
    }

    #[test]
    fn provider_kind_parses_wire_names() {
        assert_eq!(
            ProviderKind::from_str_name("vcenter"),
            Some(ProviderKind::Vcenter)
        );
        assert_eq!(
            ProviderKind::from_str_name("proxmox"),
            Some(ProviderKind::Proxmox)
        );
        assert_eq!(ProviderKind::from_str_name("hyperv"), None);
    }
}
