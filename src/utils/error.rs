use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Navigation failed: {message}")]
    NavigationError { message: String },

    #[error("Search inputs not ready: {message}")]
    InputError { message: String },

    #[error("Result validation failed: {message}")]
    ValidationError { message: String },

    #[error("Mandatory field missing: {field}")]
    ExtractionError { field: String },

    #[error("Label not found: {label}")]
    LabelNotFoundError { label: String },

    #[error("Timed out after {elapsed:?} waiting for {what}")]
    TimeoutError { what: String, elapsed: Duration },

    #[error("Browser error: {message}")]
    BrowserError { message: String },

    #[error("Query source error ({path}): {message}")]
    SourceError { path: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// 錯誤種類，寫入 RunOutcome 與 JSON 報告
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Navigation,
    Input,
    Validation,
    Extraction,
    LabelNotFound,
    Timeout,
    Browser,
    Source,
    Io,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Site,
    Data,
    Resource,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::NavigationError {
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn extraction(field: impl Into<String>) -> Self {
        Self::ExtractionError {
            field: field.into(),
        }
    }

    pub fn browser(message: impl Into<String>) -> Self {
        Self::BrowserError {
            message: message.into(),
        }
    }

    pub fn timeout(what: impl Into<String>, elapsed: Duration) -> Self {
        Self::TimeoutError {
            what: what.into(),
            elapsed,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NavigationError { .. } => ErrorKind::Navigation,
            Self::InputError { .. } => ErrorKind::Input,
            Self::ValidationError { .. } => ErrorKind::Validation,
            Self::ExtractionError { .. } => ErrorKind::Extraction,
            Self::LabelNotFoundError { .. } => ErrorKind::LabelNotFound,
            Self::TimeoutError { .. } => ErrorKind::Timeout,
            Self::BrowserError { .. } => ErrorKind::Browser,
            Self::SourceError { .. } => ErrorKind::Source,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => ErrorKind::Io,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorKind::Config,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::Navigation | ErrorKind::Input | ErrorKind::Timeout => ErrorCategory::Site,
            ErrorKind::Validation | ErrorKind::Extraction | ErrorKind::LabelNotFound => {
                ErrorCategory::Data
            }
            ErrorKind::Browser | ErrorKind::Source | ErrorKind::Io => ErrorCategory::Resource,
            ErrorKind::Config => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::LabelNotFound => ErrorSeverity::Low,
            ErrorKind::Navigation | ErrorKind::Input | ErrorKind::Timeout => ErrorSeverity::Medium,
            ErrorKind::Validation | ErrorKind::Extraction => ErrorSeverity::High,
            ErrorKind::Browser | ErrorKind::Source | ErrorKind::Io | ErrorKind::Config => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Navigation => "Check network access to the target site or raise timeouts.navigation_secs",
            ErrorKind::Input => "The search form did not render; the page layout may have changed, review [selectors]",
            ErrorKind::Validation => "Check the job title and location spelling; the site may have redirected to other results",
            ErrorKind::Extraction => "The salary page layout may have changed, review [selectors]",
            ErrorKind::LabelNotFound => "The label was not present on the page; the sentinel value was recorded",
            ErrorKind::Timeout => "Raise the matching value under [timeouts]",
            ErrorKind::Browser => "Make sure Chrome/Chromium is installed or pass --chrome <path>",
            ErrorKind::Source => "Make sure the input file exists and every row has exactly two columns",
            ErrorKind::Io => "Check that the output directory exists and is writable",
            ErrorKind::Config => "Fix the configuration file or command line flags and retry",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("Search results did not match: {}", message),
            Self::ExtractionError { field } => format!("Could not read '{}' from the results page", field),
            Self::SourceError { path, .. } => format!("Could not read queries from {}", path),
            Self::BrowserError { .. } => "Could not start or talk to the browser".to_string(),
            other => other.to_string(),
        }
    }
}
