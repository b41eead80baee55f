//! Structured output formatting for CLI commands.
//!
//! Success and error responses share one JSON envelope so scripts can
//! branch on `success` without parsing text, and every error maps to a
//! stable process exit code.

use chrono::Utc;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::Display;
use std::io::{self, Write};

use crate::domain::Issuable;
use crate::errors::IssuableError;

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            writeln_safe(&msg.to_string())
        } else {
            Ok(())
        }
    }

    /// Print informational message (suppressed by --quiet or --json)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&msg.to_string())
        } else {
            Ok(())
        }
    }

    /// Print a JSON envelope (only with --json)
    pub fn print_json<T: Serialize>(&self, output: &JsonOutput<T>) -> io::Result<()> {
        if self.json {
            let json = output.to_json_string().map_err(io::Error::other)?;
            writeln_safe(&json)
        } else {
            Ok(())
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Piping into `head` and friends closes stdout early
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// One-line human summary of an issuable
pub fn format_issuable_line(issuable: &Issuable) -> String {
    let assignee = issuable
        .assignee_id
        .map(|u| format!(" @{}", u))
        .unwrap_or_default();
    format!(
        "#{} [{}] {}{}",
        issuable.id, issuable.state, issuable.title, assignee
    )
}

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            metadata: Metadata::new(command),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Build the envelope for a library error, carrying the offending field
    /// or entity in `details`.
    pub fn from_error(err: &IssuableError, command: impl Into<String>) -> Self {
        let json = Self::new(ErrorCode::of(err), err.to_string(), command);
        match err {
            IssuableError::Validation { field, .. } => {
                json.with_details(serde_json::json!({ "field": field }))
            }
            IssuableError::NotFound { entity, id } => {
                json.with_details(serde_json::json!({ "entity": entity, "id": id }))
            }
            IssuableError::Store(_) => json,
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Error code, message and optional structured details
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "NOT_FOUND", "VALIDATION_FAILED")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Process exit codes of the `issuable` binary
///
/// Usage errors never reach this type: clap reports them and exits with 2.
///
/// # Examples
///
/// ```rust
/// use issuable::ExitCode;
///
/// assert_eq!(ExitCode::NotFound.code(), 3);
/// assert_eq!(ExitCode::ValidationFailed.code(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error, including store failures (1)
    GenericError = 1,

    /// Issuable, milestone or award not found (3)
    NotFound = 3,

    /// Validation failed: blank or overlong title, missing author (4)
    ValidationFailed = 4,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<&IssuableError> for ExitCode {
    fn from(err: &IssuableError) -> Self {
        match err {
            IssuableError::Validation { .. } => ExitCode::ValidationFailed,
            IssuableError::NotFound { .. } => ExitCode::NotFound,
            IssuableError::Store(_) => ExitCode::GenericError,
        }
    }
}

/// Error codes used in JSON error responses
pub struct ErrorCode;

impl ErrorCode {
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &'static str = "VALIDATION_FAILED";
    pub const STORE_ERROR: &'static str = "STORE_ERROR";
    pub const GENERIC_ERROR: &'static str = "GENERIC_ERROR";

    pub fn of(err: &IssuableError) -> &'static str {
        match err {
            IssuableError::Validation { .. } => Self::VALIDATION_FAILED,
            IssuableError::NotFound { .. } => Self::NOT_FOUND,
            IssuableError::Store(_) => Self::STORE_ERROR,
        }
    }
}

/// Response metadata
#[derive(Debug, Serialize)]
pub struct Metadata {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

/// Serialize timestamp in ISO 8601 format
fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}
