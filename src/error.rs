use serde::{Serialize, Deserialize};
use std::fmt;

/// Shape violations caught at the engine boundary, before any rule runs.
/// These are caller-contract errors, not validation verdicts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("invalid submission shape: {field} {reason}")]
    InvalidSubmissionShape { field: String, reason: String },
    #[error("invalid goal: {field} {reason}")]
    InvalidGoal { field: String, reason: String },
    #[error("malformed curriculum plan: {reason}")]
    MalformedPlan { reason: String },
}

impl ShapeError {
    pub fn submission<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        ShapeError::InvalidSubmissionShape { field: field.into(), reason: reason.into() }
    }

    pub fn goal<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        ShapeError::InvalidGoal { field: field.into(), reason: reason.into() }
    }

    pub fn plan<R: Into<String>>(reason: R) -> Self {
        ShapeError::MalformedPlan { reason: reason.into() }
    }
}

/// Unified error type for everything around the engine: stores, config,
/// the advice collaborator and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerError {
    pub message: String,
    pub stage: String,
    pub user: Option<String>,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl TrackerError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        TrackerError {
            message: message.into(),
            stage: stage.to_string(),
            user: None,
            context: None,
            source: None,
        }
    }

    /// Attach the user the failing operation was acting for
    pub fn with_user<S: Into<String>>(mut self, user: S) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref user) = self.user {
            write!(f, " (user: {})", user)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for TrackerError {}

impl From<ShapeError> for TrackerError {
    fn from(err: ShapeError) -> Self {
        TrackerError::new(err.to_string(), "shape").with_source("engine")
    }
}

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        TrackerError::new(
            err.to_string(),
            "unknown"
        ).with_source("anyhow")
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::new(
            format!("I/O error: {}", err),
            "io"
        ).with_source("std::io")
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::new(
            format!("JSON error: {}", err),
            "json_parse"
        ).with_source("serde_json")
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(err: toml::de::Error) -> Self {
        TrackerError::new(
            format!("TOML error: {}", err),
            "config"
        ).with_source("toml")
    }
}

impl From<tokio::time::error::Elapsed> for TrackerError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        TrackerError::new(
            "Operation timed out",
            "timeout"
        ).with_source("tokio::time")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = TrackerError::new("Test error", "test_stage");
        assert_eq!(error.message, "Test error");
        assert_eq!(error.stage, "test_stage");
    }

    #[test]
    fn test_error_with_context_and_user() {
        let error = TrackerError::new("Test error", "test_stage")
            .with_context("Additional context")
            .with_user("u-42");
        assert_eq!(error.context.as_deref(), Some("Additional context"));
        assert_eq!(error.user.as_deref(), Some("u-42"));
    }

    #[test]
    fn test_error_display() {
        let error = TrackerError::new("Test error", "test_stage")
            .with_context("context")
            .with_user("u-1");
        let display = format!("{}", error);
        assert!(display.contains("test_stage"));
        assert!(display.contains("Test error"));
        assert!(display.contains("u-1"));
    }

    #[test]
    fn test_shape_error_converts_with_stage() {
        let err: TrackerError = ShapeError::submission("theoryHours", "must not be negative").into();
        assert_eq!(err.stage, "shape");
        assert!(err.message.contains("theoryHours"));
    }
}
