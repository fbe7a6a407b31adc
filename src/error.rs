//! Error types for the ceremony CLI.
//!
//! Every fatal path renders a single operator-facing line via `Display`;
//! the binary prints that line and exits non-zero. Recoverable conditions
//! (bad password, duplicate key, threshold above key count) never reach
//! this type - they are handled by re-prompting.

use thiserror::Error;

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum Error {
    /// The operator declined a confirmation point.
    #[error("Ceremony aborted.")]
    Aborted,

    /// Missing or inconsistent command-line configuration.
    #[error("{0}")]
    Config(String),

    /// The server reported bootstrap as already completed.
    #[error("{0}")]
    AlreadyBootstrapped(String),

    /// The server answered with an error status.
    #[error("Error {status} {detail}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw response text.
        detail: String,
    },

    /// A 202 acknowledgement without both a task id and a message.
    #[error("{0}")]
    MalformedAccept(String),

    /// A task poll answered with a non-200 status.
    #[error("Unexpected response {0}")]
    UnexpectedResponse(String),

    /// A task poll answered 200 without a `data` object.
    #[error("No data received")]
    NoData,

    /// A task poll answered 200 with `data` but no state.
    #[error("No state in data received")]
    NoState,

    /// The server task finished in the FAILURE state.
    #[error("Failed: {0}")]
    TaskFailed(String),

    /// The server task finished in SUCCESS without confirming bootstrap.
    #[error("Something went wrong, result: {0}")]
    BootstrapIncomplete(String),

    /// The task never reached a terminal state within the poll budget.
    #[error("Task {task_id} still pending after {attempts} polls; check the server and retry")]
    PollTimeout {
        /// Id of the task being polled.
        task_id: String,
        /// Number of polls performed.
        attempts: u32,
    },

    /// The server URL (or a derived endpoint) did not parse.
    #[error("Invalid server URL: {0}")]
    InvalidServer(#[from] url::ParseError),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Terminal prompt failure.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Filesystem failure (saving the payload, building the runtime).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
