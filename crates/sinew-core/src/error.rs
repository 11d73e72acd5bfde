//! Error types for Sinew

use thiserror::Error;

/// The main error type for Sinew operations
#[derive(Debug, Error)]
pub enum SinewError {
    #[error("Layer has no state graph assigned")]
    StateGraphNotSet,

    #[error("State not found: {0}")]
    StateNotFound(String),

    #[error("Transition '{transition}' not found in state '{state}'")]
    TransitionNotFound { state: String, transition: String },

    #[error("Layer is not in any state")]
    NoCurrentState,

    #[error("State '{0}' has an empty blend tree")]
    EmptyBlendTree(String),

    #[error("Blend factor not found: {0}")]
    FactorNotFound(String),

    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    #[error("Invalid state graph: {0}")]
    InvalidStateGraph(String),

    #[error("Transition '{transition}' targets unknown state '{target}'")]
    TransitionTargetNotFound { transition: String, target: String },

    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    #[error("Cannot build additive clip: {0}")]
    AdditiveMismatch(String),

    #[error("Controller limit reached ({0})")]
    ControllerLimit(usize),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Sinew operations
pub type Result<T> = std::result::Result<T, SinewError>;

impl From<toml::de::Error> for SinewError {
    fn from(err: toml::de::Error) -> Self {
        SinewError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_state_and_transition() {
        let err = SinewError::TransitionNotFound {
            state: "idle".into(),
            transition: "jump".into(),
        };
        assert_eq!(err.to_string(), "Transition 'jump' not found in state 'idle'");
    }

    #[test]
    fn toml_errors_convert() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("name = ");
        let err: SinewError = parsed.unwrap_err().into();
        assert!(matches!(err, SinewError::TomlParseError(_)));
    }
}
