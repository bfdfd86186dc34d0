//! CLI error types and exit codes

use ramp_client::RampError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Validation error, not found, or contract mismatch
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify the API base URL is correct\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Contract check failed: {0}")]
    ContractMismatch(String),

    #[error("Deferred task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("Deferred task {task_id} has not finished after {polls} poll(s)")]
    TaskPending { task_id: String, polls: u32 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_)
            | CliError::NotFound(_)
            | CliError::Conflict(_)
            | CliError::ContractMismatch(_) => 4,
            CliError::Server(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Config(_)
            | CliError::TaskFailed { .. }
            | CliError::TaskPending { .. }
            | CliError::Output(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some(
                "Set RAMP_ACCESS_TOKEN, or RAMP_CLIENT_ID and RAMP_CLIENT_SECRET, or pass --config <file>.",
            ),
            CliError::AuthenticationFailed(_) => {
                Some("Check that the client has the users:read and users:write scopes.")
            }
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            CliError::TaskPending { .. } => {
                Some("Check progress later with 'ramp users task-status <task_id>'.")
            }
            _ => None,
        }
    }
}

impl From<RampError> for CliError {
    fn from(e: RampError) -> Self {
        match e {
            RampError::InvalidConfig(msg) => CliError::Config(msg),
            RampError::AuthError(msg) => CliError::AuthenticationFailed(msg),
            RampError::Validation(msg) => CliError::Validation(msg),
            RampError::NotFound(msg) => CliError::NotFound(msg),
            RampError::Conflict(msg) => CliError::Conflict(msg),
            RampError::RateLimited { .. } => CliError::Api {
                status: 429,
                message: e.to_string(),
            },
            RampError::Api { status, detail } => {
                if status >= 500 {
                    CliError::Server(format!("HTTP {status}: {detail}"))
                } else {
                    CliError::Api {
                        status,
                        message: detail,
                    }
                }
            }
            RampError::Unreachable(msg) => CliError::ConnectionFailed(msg),
            RampError::Timeout(msg) => CliError::Network(format!("timed out: {msg}")),
            RampError::TaskPending { task_id, polls } => CliError::TaskPending { task_id, polls },
            RampError::ParseError(msg) => CliError::ContractMismatch(msg),
            RampError::ShapeMismatch(mismatch) => CliError::ContractMismatch(mismatch.to_string()),
            RampError::MaxRetriesExceeded { .. } => CliError::Server(e.to_string()),
            RampError::Http(err) => CliError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
