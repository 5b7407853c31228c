//! Scenario state for the BDD suite

use campsuite_e2e::pages::{BasePage, FormsPage, HomePage, SamplePage};
use campsuite_e2e::{BrowserSession, DriverFactory, E2eResult, ScreenshotStore, SuiteConfig};
use cucumber::World;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{error, info};

/// Run-wide settings shared by every scenario
#[derive(Debug)]
pub struct Harness {
    pub config: SuiteConfig,
    pub screenshots: ScreenshotStore,
    pub endpoint_url: String,
}

static HARNESS: OnceLock<Harness> = OnceLock::new();

/// Register the run-wide settings; called once before any scenario starts
pub fn install(harness: Harness) {
    if HARNESS.set(harness).is_err() {
        panic!("BDD harness installed twice");
    }
}

pub fn harness() -> &'static Harness {
    HARNESS.get().expect("BDD harness not installed")
}

/// Each scenario gets a fresh world and its own browser
#[derive(Debug, Default, World)]
pub struct CampWorld {
    session: Option<BrowserSession>,
}

impl CampWorld {
    pub async fn start_browser(&mut self) -> E2eResult<()> {
        let harness = harness();
        let session = DriverFactory::new(&harness.config)?
            .create(&harness.endpoint_url)
            .await?;
        self.session = Some(session);
        Ok(())
    }

    pub async fn close_browser(&mut self) {
        if let Some(session) = self.session.take() {
            session.quit().await;
            info!("Browser closed");
        }
    }

    /// Save `error_<scenario>_<timestamp>.png` for a failed scenario
    pub async fn capture_failure(&self, scenario: &str) {
        let Some(session) = &self.session else {
            return;
        };
        let name = ScreenshotStore::timestamped(scenario);
        match harness().screenshots.capture(session.driver(), &name).await {
            Some(path) => error!("Screenshot saved to {}", path.display()),
            None => error!("Could not capture failure screenshot for '{}'", scenario),
        }
    }

    pub fn config(&self) -> &'static SuiteConfig {
        &harness().config
    }

    pub fn base(&self) -> BasePage<'_> {
        let harness = harness();
        let session = self.session.as_ref().expect("Browser not initialized");
        BasePage::new(session.driver(), &harness.config, &harness.screenshots)
    }

    pub fn home_page(&self) -> HomePage<'_> {
        HomePage::new(self.base())
    }

    pub fn sample_page(&self) -> SamplePage<'_> {
        SamplePage::new(self.base())
    }

    pub fn forms_page(&self) -> FormsPage<'_> {
        FormsPage::new(self.base())
    }

    pub fn has_browser(&self) -> bool {
        self.session.is_some()
    }
}

/// Files uploaded by the forms scenario
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("uploads")
        .join(name)
}
