//! The ordered phase table a migration run walks through.

/// A named step within the running state, driving progress toward a
/// target percentage. Not persisted.
#[derive(Debug, Clone, Copy)]
pub struct Phase {
    pub label: &'static str,
    pub target: i16,
}

/// Progress recorded once source connectivity is confirmed.
pub const PROGRESS_SOURCE_CONNECTED: i16 = 10;

/// Progress recorded once destination connectivity is confirmed and the
/// candidate node list is in hand.
pub const PROGRESS_TARGETS_FETCHED: i16 = 20;

/// Progress recorded once the migration plan is resolved.
pub const PROGRESS_PLANNED: i16 = 30;

/// The transfer pipeline. Targets are strictly increasing and the final
/// phase lands exactly on 100.
pub const MIGRATION_PHASES: [Phase; 5] = [
    Phase {
        label: "Export VM from vCenter as OVA",
        target: 50,
    },
    Phase {
        label: "Convert disks to qcow2 using qemu-img",
        target: 65,
    },
    Phase {
        label: "Upload converted disks to Proxmox storage",
        target: 80,
    },
    Phase {
        label: "Provision Proxmox VM and attach disks",
        target: 90,
    },
    Phase {
        label: "Initiate Proxmox live migration",
        target: 100,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_targets_are_strictly_increasing() {
        let mut previous = PROGRESS_PLANNED;
        for phase in &MIGRATION_PHASES {
            assert!(
                phase.target > previous,
                "phase '{}' target {} does not exceed {previous}",
                phase.label,
                phase.target,
            );
            previous = phase.target;
        }
    }

    #[test]
    fn final_phase_lands_on_one_hundred() {
        assert_eq!(MIGRATION_PHASES.last().unwrap().target, 100);
    }

    #[test]
    fn setup_checkpoints_precede_all_phases() {
        assert!(PROGRESS_SOURCE_CONNECTED < PROGRESS_TARGETS_FETCHED);
        assert!(PROGRESS_TARGETS_FETCHED < PROGRESS_PLANNED);
        assert!(PROGRESS_PLANNED < MIGRATION_PHASES[0].target);
    }
}
