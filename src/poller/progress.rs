use crate::core::models::TaskStatus;

/// Display progress and label for one backend status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub progress: u8,
    pub label: &'static str,
}

const STATUS_STEPS: &[(TaskStatus, Step)] = &[
    (
        TaskStatus::ValidatingIsbn,
        Step {
            progress: 20,
            label: "Validating ISBN...",
        },
    ),
    (
        TaskStatus::CollectingData,
        Step {
            progress: 40,
            label: "Collecting reviews and descriptions...",
        },
    ),
    (
        TaskStatus::DataCollected,
        Step {
            progress: 60,
            label: "Cross-referencing sources...",
        },
    ),
    (
        TaskStatus::GeneratingSummary,
        Step {
            progress: 80,
            label: "Generating AI summary...",
        },
    ),
    (
        TaskStatus::Completed,
        Step {
            progress: 100,
            label: "Summary ready",
        },
    ),
    (
        TaskStatus::Failed,
        Step {
            progress: 100,
            label: "Summary failed",
        },
    ),
];

pub const SUBMITTING_LABEL: &str = "Submitting request...";

/// `None` for statuses the client does not know.
#[must_use]
pub fn step_for(status: TaskStatus) -> Option<Step> {
    STATUS_STEPS
        .iter()
        .find(|(known, _)| *known == status)
        .map(|(_, step)| *step)
}
