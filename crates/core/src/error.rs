//! Error types for the glyphfield core.

use thiserror::Error;

/// Errors produced while configuring or wiring up a particle field.
///
/// Ticking, force evaluation and sampling are total and never produce these;
/// only construction-time inputs and external assets can fail.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Width or height was zero (or overflowed) where a non-empty buffer is required.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was outside its usable range.
    #[error("invalid config value for '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// An external asset (texture, font) could not be loaded.
    #[error("asset unavailable: {path}: {reason}")]
    AssetUnavailable { path: String, reason: String },

    /// A scene mode name was not recognized.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// An I/O failure while writing output.
    #[error("I/O error: {0}")]
    Io(String),
}
