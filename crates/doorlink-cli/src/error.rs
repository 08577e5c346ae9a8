//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use doorlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No appliance URL configured")]
    #[diagnostic(
        code(doorlink::no_appliance),
        help(
            "Pass --appliance http://alarm.local:8080, set DOORLINK_APPLIANCE,\n\
             or put appliance = \"...\" in {path}"
        )
    )]
    NoAppliance { path: String },

    #[error("Invalid appliance URL: {url}")]
    #[diagnostic(
        code(doorlink::invalid_url),
        help("Expected a full http(s) URL, e.g. http://alarm.local:8080")
    )]
    InvalidUrl { url: String },

    #[error(transparent)]
    #[diagnostic(code(doorlink::api))]
    Core(#[from] CoreError),

    #[error("Prompt failed")]
    #[diagnostic(code(doorlink::prompt))]
    Prompt(#[from] dialoguer::Error),

    #[error("I/O error")]
    #[diagnostic(code(doorlink::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoAppliance { .. } | Self::InvalidUrl { .. } => exit_code::USAGE,
            Self::Core(e) if e.is_transient() => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}
