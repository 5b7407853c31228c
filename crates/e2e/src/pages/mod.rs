//! Page objects for the practice site
//!
//! Every page wraps a [`BasePage`], which owns the wait strategies, click
//! fallbacks and failure screenshots shared by all pages.

use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, error};

use crate::artifacts::ScreenshotStore;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::{Locator, NamedLocator};

pub mod forms;
pub mod home;
pub mod sample;

pub use forms::{FormsPage, UploadSlot};
pub use home::HomePage;
pub use sample::{RegistrationForm, SamplePage};

/// Interval between element polls
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settle time after scrolling an element into view
const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Shared browser interactions for all page objects
pub struct BasePage<'a> {
    driver: &'a WebDriver,
    config: &'a SuiteConfig,
    screenshots: &'a ScreenshotStore,
    default_timeout: Duration,
}

impl<'a> BasePage<'a> {
    pub fn new(driver: &'a WebDriver, config: &'a SuiteConfig, screenshots: &'a ScreenshotStore) -> Self {
        Self {
            driver,
            config,
            screenshots,
            default_timeout: config.default_timeout(),
        }
    }

    pub fn driver(&self) -> &'a WebDriver {
        self.driver
    }

    pub fn config(&self) -> &'a SuiteConfig {
        self.config
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Wait for an element to be displayed; screenshots on timeout
    pub async fn wait_for_visible(&self, locator: &Locator, timeout: Option<Duration>) -> E2eResult<WebElement> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        match self.probe_visible(locator, timeout).await {
            Ok(elem) => {
                debug!("Element found: {}", locator);
                Ok(elem)
            }
            Err(e) => {
                error!("Element not visible: {}", locator);
                self.take_screenshot(&format!("element_not_found_{}", locator.value()))
                    .await;
                Err(e)
            }
        }
    }

    /// Wait for an element to be displayed and enabled; screenshots on timeout
    pub async fn wait_for_clickable(&self, locator: &Locator, timeout: Option<Duration>) -> E2eResult<WebElement> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let found = self
            .driver
            .query(locator.by())
            .wait(timeout, POLL_INTERVAL)
            .and_clickable()
            .first()
            .await;

        match found {
            Ok(elem) => Ok(elem),
            Err(e) => {
                debug!("Clickable query failed: {}", e);
                error!("Element not clickable: {}", locator);
                self.take_screenshot(&format!("element_not_clickable_{}", locator.value()))
                    .await;
                Err(E2eError::timeout(format!("clickable {}", locator), timeout))
            }
        }
    }

    /// Wait for an element to exist in the DOM, visible or not
    pub async fn wait_for_present(&self, locator: &Locator, timeout: Option<Duration>) -> E2eResult<WebElement> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        self.driver
            .query(locator.by())
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map_err(|_| {
                E2eError::timeout(
                    format!("Element {} not present after {} seconds", locator, timeout.as_secs()),
                    timeout,
                )
            })
    }

    /// Visibility wait without the failure screenshot, for fallback probing
    pub async fn probe_visible(&self, locator: &Locator, timeout: Duration) -> E2eResult<WebElement> {
        self.driver
            .query(locator.by())
            .wait(timeout, POLL_INTERVAL)
            .and_displayed()
            .first()
            .await
            .map_err(|_| E2eError::timeout(format!("visible {}", locator), timeout))
    }

    /// First locator in `candidates` whose element is displayed
    pub async fn first_visible(
        &self,
        candidates: &[NamedLocator],
        timeout: Option<Duration>,
    ) -> Option<(&'static str, WebElement)> {
        let timeout = timeout.unwrap_or(self.default_timeout);

        for candidate in candidates {
            match self.probe_visible(&candidate.locator, timeout).await {
                Ok(elem) if elem.is_displayed().await.unwrap_or(false) => {
                    return Some((candidate.name, elem));
                }
                Ok(_) => debug!("{} locator matched a hidden element", candidate.name),
                Err(_) => debug!("Could not find element using {} locator", candidate.name),
            }
        }
        None
    }

    /// Native click, falling back to a JavaScript click
    pub async fn safe_click(&self, elem: &WebElement) -> E2eResult<()> {
        if let Err(e) = elem.click().await {
            debug!("Native click failed ({}), trying JavaScript click", e);
            self.js_click(elem).await.map_err(|e| {
                error!("Failed to click element: {}", e);
                e
            })?;
        }
        Ok(())
    }

    pub async fn js_click(&self, elem: &WebElement) -> E2eResult<()> {
        self.driver
            .execute("arguments[0].click();", vec![elem.to_json()?])
            .await?;
        Ok(())
    }

    /// Scroll `elem` into view; failures are only logged
    pub async fn scroll_to(&self, elem: &WebElement) {
        let scrolled = async {
            self.driver
                .execute("arguments[0].scrollIntoView(true);", vec![elem.to_json()?])
                .await?;
            Ok::<(), E2eError>(())
        }
        .await;

        match scrolled {
            Ok(()) => {
                tokio::time::sleep(SCROLL_SETTLE).await;
                debug!("Scrolled to element successfully");
            }
            Err(e) => error!("Failed to scroll to element: {}", e),
        }
    }

    pub async fn take_screenshot(&self, name: &str) -> Option<std::path::PathBuf> {
        self.screenshots.capture(self.driver, name).await
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    /// Navigate to an absolute URL
    pub async fn open(&self, url: &str) -> E2eResult<()> {
        self.driver.goto(url).await?;
        Ok(())
    }
}
