//! Error types surfaced by the transition engine.
//!
//! Superseded cycles are not errors and never show up here; they settle
//! silently through the generation guard.

use thiserror::Error;

/// Failures that reach the caller of a phase invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// An easing name that is not in the preset registry.
    #[error("unknown easing preset '{name}'")]
    UnknownEasing { name: String },

    /// A property path the target cannot read or write.
    #[error("property '{path}' is not present on the target")]
    MissingProperty { path: String },

    /// A configuration document that could not be parsed at all.
    #[error("invalid transition config: {message}")]
    InvalidConfig { message: String },
}

impl From<serde_json::Error> for TransitionError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = TransitionError::UnknownEasing {
            name: "wobble".into(),
        };
        assert_eq!(err.to_string(), "unknown easing preset 'wobble'");

        let err = TransitionError::MissingProperty {
            path: "position.z".into(),
        };
        assert!(err.to_string().contains("position.z"));
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err: TransitionError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, TransitionError::InvalidConfig { .. }));
    }
}
