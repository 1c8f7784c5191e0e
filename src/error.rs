//! Error types raised while turning a configuration into an execution plan.

use thiserror::Error;

/// Result type alias using [`PlanError`].
pub type PlanResult<T> = Result<T, PlanError>;

/// Fatal errors found while building an execution plan.
///
/// Every variant is raised before any extraction or upload starts, so a run
/// either gets a complete plan or a single error report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed or semantically invalid user configuration.
    #[error("Configuration error in {context}: {message}")]
    Configuration { context: String, message: String },

    /// A referenced datafile, stub or directory could not be found.
    #[error("Could not resolve datafile '{entry}': {message}")]
    Resolution { entry: String, message: String },
}

impl PlanError {
    pub fn config(context: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError::Configuration {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn resolution(entry: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError::Resolution {
            entry: entry.into(),
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PlanError::Configuration { .. })
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self, PlanError::Resolution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = PlanError::config("global", "unknown datatype 'foo'");
        assert_eq!(
            err.to_string(),
            "Configuration error in global: unknown datatype 'foo'"
        );
        assert!(err.is_configuration());
        assert!(!err.is_resolution());
    }

    #[test]
    fn test_resolution_display() {
        let err = PlanError::resolution("model/CASE", "no datafile found");
        assert!(err.to_string().contains("model/CASE"));
        assert!(err.is_resolution());
    }
}
