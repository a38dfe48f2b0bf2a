//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use roundtable_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No server configured")]
    #[diagnostic(
        code(roundtable::no_server),
        help(
            "Pass --server, set GD_SERVER, or run: roundtable config init --server <url>\n\
             Config file: {path}"
        )
    )]
    NoServer { path: String },

    #[error("No user id configured")]
    #[diagnostic(
        code(roundtable::no_user),
        help("Pass --user, set GD_USER, or add auth.user_id to the config file.")
    )]
    NoUser,

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(roundtable::auth_failed),
        help("Check the bearer token (--token, GD_TOKEN, or [auth] in the config file).")
    )]
    AuthFailed { message: String },

    #[error("Cannot reach server: {reason}")]
    #[diagnostic(
        code(roundtable::connection_failed),
        help("Check the server URL and your network connection.")
    )]
    ConnectionFailed { reason: String },

    #[error("Not found: {identifier}")]
    #[diagnostic(code(roundtable::not_found))]
    NotFound { identifier: String },

    #[error("{message}")]
    #[diagnostic(code(roundtable::rejected))]
    Rejected { message: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(roundtable::invalid_input))]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(roundtable::config))]
    Config { message: String },

    #[error("{0}")]
    #[diagnostic(code(roundtable::general))]
    Other(String),

    #[error(transparent)]
    #[diagnostic(code(roundtable::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoServer { .. }
            | Self::NoUser
            | Self::InvalidInput { .. }
            | Self::Config { .. } => exit_code::USAGE,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Rejected { .. } | Self::Other(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput { field, reason } => Self::InvalidInput {
                field: field.to_owned(),
                reason,
            },
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotFound { identifier, .. } => Self::NotFound { identifier },
            CoreError::Rejected { message } | CoreError::Network { message } => {
                Self::Rejected { message }
            }
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Other(message),
        }
    }
}

impl From<roundtable_api::Error> for CliError {
    fn from(err: roundtable_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<roundtable_config::ConfigError> for CliError {
    fn from(err: roundtable_config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}
