//! Wire types for the repository-service bootstrap API.

use serde::Deserialize;

/// Response to `GET /api/v1/bootstrap/`.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapStatus {
    /// Whether the repository was already bootstrapped.
    pub bootstrap: bool,
    /// Optional server-provided detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a 202 acknowledgement to `POST /api/v1/bootstrap/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapAccepted {
    /// Task envelope.
    #[serde(default)]
    pub data: Option<BootstrapAcceptedData>,
    /// Printable acknowledgement message.
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` member of a 202 acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapAcceptedData {
    /// Id of the server-side task applying the bootstrap.
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Task states observed over the wire.
///
/// Anything that is not a known terminal state keeps the poll loop running,
/// so unknown pending states introduced by newer servers do not abort it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// The worker picked the task up.
    Started,
    /// Terminal: the task finished successfully.
    Success,
    /// Terminal: the task failed.
    Failure,
    /// Any other (pending) state.
    Pending(String),
}

impl From<&str> for TaskState {
    fn from(raw: &str) -> Self {
        match raw {
            "STARTED" => TaskState::Started,
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            other => TaskState::Pending(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_states_are_pending() {
        assert_eq!(TaskState::from("STARTED"), TaskState::Started);
        assert_eq!(TaskState::from("SUCCESS"), TaskState::Success);
        assert_eq!(TaskState::from("FAILURE"), TaskState::Failure);
        assert_eq!(
            TaskState::from("RECEIVED"),
            TaskState::Pending("RECEIVED".to_string())
        );
    }
}
