//! Errors surfaced by the `glyphfield` binary and the exit code each maps to.
//!
//! Malformed flags, including a `--resize-at` that is not `WxH@FRAME`, are
//! rejected by clap with exit code 2 before any of these are built.
//!
//! | code | variant |
//! |------|---------|
//! | 10 | [`CliError::Field`]: unknown mode, invalid scene config, unreadable font |
//! | 11 | [`CliError::Io`]: `--config` read or PNG snapshot write |
//! | 12 | [`CliError::Input`]: `--params` or config file that is not JSON |
//! | 13 | [`CliError::Serialization`]: JSON output could not be produced |

use glyphfield_core::FieldError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// The scene could not be built from the requested mode and overrides.
    Field(FieldError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Field(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Field(e) => write!(f, "scene: {e}"),
            CliError::Io(msg) => write!(f, "i/o: {msg}"),
            CliError::Input(msg) => write!(f, "input: {msg}"),
            CliError::Serialization(msg) => write!(f, "output: {msg}"),
        }
    }
}

impl From<FieldError> for CliError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::Io(msg) => CliError::Io(msg),
            other => CliError::Field(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_exit_code_is_10() {
        let err = CliError::Field(FieldError::UnknownMode("foo".into()));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn io_error_exit_code_is_11() {
        assert_eq!(CliError::Io("write failed".into()).exit_code(), 11);
    }

    #[test]
    fn bad_params_json_is_an_input_error() {
        let err = CliError::Input("invalid --params JSON: expected value".into());
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().starts_with("input: "));
    }

    #[test]
    fn serialization_error_exit_code_is_13() {
        assert_eq!(CliError::Serialization("json fail".into()).exit_code(), 13);
    }

    #[test]
    fn from_field_error_io_routes_to_cli_io() {
        let cli_err = CliError::from(FieldError::Io("disk full".into()));
        assert_eq!(cli_err.exit_code(), 11);
        assert!(cli_err.to_string().contains("disk full"));
    }

    #[test]
    fn from_field_error_non_io_routes_to_cli_field() {
        let cli_err = CliError::from(FieldError::UnknownMode("xyz".into()));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().starts_with("scene: "));
        assert!(cli_err.to_string().contains("xyz"));
    }

    #[test]
    fn from_serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }
}
