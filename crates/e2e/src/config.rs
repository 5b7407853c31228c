//! Suite configuration loaded from the environment (and an optional `.env`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{E2eError, E2eResult};

pub const DEFAULT_BASE_URL: &str = "https://play1.automationcamp.ir/index.html";

/// Browsers the driver factory knows how to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
}

/// Runtime configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Environment label (dev, qa, prod)
    pub test_env: String,

    /// Homepage of the site under test
    pub base_url: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Requested browser name, validated when a driver is created
    pub browser: String,

    /// Element wait timeout in seconds
    pub default_timeout_secs: u64,

    /// Long wait timeout in seconds (page transitions)
    pub explicit_timeout_secs: u64,

    /// Remote WebDriver endpoint; skips local driver provisioning
    pub webdriver_url: Option<String>,

    /// Explicit driver binary; skips version resolution
    pub chromedriver_path: Option<PathBuf>,

    /// Where provisioned drivers are cached
    pub driver_cache_dir: PathBuf,

    pub screenshot_dir: PathBuf,
    pub download_dir: PathBuf,
    pub reports_dir: PathBuf,

    /// Running under GitHub Actions
    pub ci: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            test_env: "qa".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: false,
            browser: "chrome".to_string(),
            default_timeout_secs: 10,
            explicit_timeout_secs: 20,
            webdriver_url: None,
            chromedriver_path: None,
            driver_cache_dir: default_driver_cache_dir(),
            screenshot_dir: PathBuf::from("screenshots"),
            download_dir: PathBuf::from("downloads"),
            reports_dir: PathBuf::from("reports"),
            ci: false,
        }
    }
}

impl SuiteConfig {
    /// Load `.env` (if present) and read configuration from the process environment
    pub fn from_env() -> E2eResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment file {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(E2eError::Config(format!(".env: {}", e))),
        }

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!("Initialized configuration for {} environment", config.test_env);
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            test_env: get("TEST_ENV").unwrap_or(defaults.test_env),
            base_url: get("BASE_URL").unwrap_or(defaults.base_url),
            headless: get("HEADLESS")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.headless),
            browser: get("BROWSER")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or(defaults.browser),
            default_timeout_secs: parse_secs("DEFAULT_TIMEOUT", get("DEFAULT_TIMEOUT"))?
                .unwrap_or(defaults.default_timeout_secs),
            explicit_timeout_secs: parse_secs("EXPLICIT_TIMEOUT", get("EXPLICIT_TIMEOUT"))?
                .unwrap_or(defaults.explicit_timeout_secs),
            webdriver_url: get("WEBDRIVER_URL"),
            chromedriver_path: get("CHROMEDRIVER_PATH").map(PathBuf::from),
            driver_cache_dir: get("DRIVER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.driver_cache_dir),
            screenshot_dir: get("SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.screenshot_dir),
            download_dir: get("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            reports_dir: get("REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reports_dir),
            ci: get("GITHUB_ACTIONS").is_some(),
        };

        Url::parse(&config.base_url)
            .map_err(|e| E2eError::Config(format!("BASE_URL '{}': {}", config.base_url, e)))?;

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        info!("Using URL for {} environment: {}", self.test_env, self.base_url);
        &self.base_url
    }

    /// Resolve a sibling page (e.g. `forms.html`) against the base URL
    pub fn page_url(&self, page: &str) -> E2eResult<String> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(page)?.to_string())
    }

    pub fn is_ci(&self) -> bool {
        self.ci
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn explicit_timeout(&self) -> Duration {
        Duration::from_secs(self.explicit_timeout_secs)
    }

    /// The browser to launch; anything but chrome is rejected
    pub fn browser(&self) -> E2eResult<Browser> {
        match self.browser.as_str() {
            "chrome" | "chromium" => Ok(Browser::Chrome),
            other => Err(E2eError::UnsupportedBrowser(other.to_string())),
        }
    }

    /// Whether the browser runs without a window, either by request or because of CI
    pub fn effective_headless(&self) -> bool {
        self.headless || self.ci
    }
}

fn parse_secs(key: &str, value: Option<String>) -> E2eResult<Option<u64>> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| E2eError::Config(format!("{} '{}': {}", key, v, e)))
        })
        .transpose()
}

fn default_driver_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("campsuite")
        .join("drivers")
}
