use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for screen matching operations.
pub type MatchResult<T> = Result<T, MatchError>;

/// The error type for everything that can go wrong during one lookup.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Usage: {program} <image_path>")]
    Usage { program: String },

    #[error("Screen capture environment is not usable: {description}")]
    Environment { description: String },

    #[error("Template image not found: {path:?}")]
    TemplateNotFound { path: PathBuf },

    #[error("Template image {path:?} could not be read: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Template {path:?} not found on screen after {attempts} attempts in {elapsed:?}")]
    Timeout {
        path: PathBuf,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Invalid search configuration: {description}")]
    InvalidConfig { description: String },

    #[error("Template {template_width}x{template_height} is larger than the screen {screen_width}x{screen_height}")]
    TemplateTooLarge {
        template_width: u32,
        template_height: u32,
        screen_width: u32,
        screen_height: u32,
    },

    #[error("Cannot match an empty image")]
    EmptyImage,

    #[error("Template is a single flat color and cannot be correlated")]
    FlatTemplate,

    #[error("No monitor available for capture")]
    NoMonitor,

    #[error("Screen capture failed: {source}")]
    Capture {
        #[from]
        source: xcap::XCapError,
    },

    #[error("Image operation failed: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },

    #[error("Blocking task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl MatchError {
    /// Whether this is the ordinary "searched until the deadline" outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MatchError::Timeout { .. })
    }

    /// Wrap any failure during the startup check as an environment error.
    pub fn into_environment(self) -> Self {
        match self {
            env @ MatchError::Environment { .. } => env,
            other => MatchError::Environment {
                description: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let missing = MatchError::TemplateNotFound {
            path: PathBuf::from("missing.png"),
        };
        assert!(!missing.is_timeout());

        let timeout = MatchError::Timeout {
            path: PathBuf::from("button.png"),
            attempts: 21,
            elapsed: Duration::from_secs(10),
        };
        assert!(timeout.is_timeout());
    }

    #[test]
    fn test_into_environment_keeps_message() {
        let err = MatchError::NoMonitor.into_environment();
        match &err {
            MatchError::Environment { description } => {
                assert_eq!(description, "No monitor available for capture")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Already an environment error: left untouched
        let again = err.into_environment();
        assert!(again.to_string().starts_with("Screen capture environment"));
    }

    #[test]
    fn test_usage_message() {
        let err = MatchError::Usage {
            program: "image-matcher".to_string(),
        };
        assert_eq!(err.to_string(), "Usage: image-matcher <image_path>");
    }
}
