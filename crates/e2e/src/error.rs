//! Error types for the E2E suite

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported browser: {0} (only chrome is supported)")]
    UnsupportedBrowser(String),

    #[error("Could not detect installed browser version: {0}")]
    BrowserVersion(String),

    #[error("No driver download resolved for {version}: {reason}")]
    DriverResolution { version: String, reason: String },

    #[error("Driver download failed from {url}: {reason}")]
    DriverDownload { url: String, reason: String },

    #[error("Driver archive is invalid: {0}")]
    DriverArchive(String),

    #[error("Driver service failed to start: {0}")]
    DriverStartup(String),

    #[error("Driver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Timeout waiting for {what} after {}s", .after.as_secs())]
    Timeout { what: String, after: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Environment switch failed: {0}")]
    EnvSwitch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl E2eError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        E2eError::Timeout {
            what: what.into(),
            after,
        }
    }

    /// Whether this error came from an element wait running out
    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout { .. })
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
