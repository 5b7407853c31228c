//! Campsuite E2E Test Framework
//!
//! Browser tests for the automationcamp practice site, driven from Rust:
//! - Loads suite settings from the environment and the active `.env` file
//! - Provisions a chromedriver matching the installed browser
//! - Runs one driver service per run and a fresh browser per scenario
//! - Wraps each site page in a page object with waits and fallbacks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  BDD harness (tests/bdd)                    │
//! │    features/*.feature -> steps -> page objects              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteConfig::from_env()                                    │
//! │  DriverEndpoint::start(&config)                             │
//! │    ├── WEBDRIVER_URL set -> remote endpoint                 │
//! │    └── DriverProvisioner::ensure_driver() -> DriverService  │
//! │  DriverFactory::create(url) -> BrowserSession               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  pages                                                      │
//! │    ├── BasePage   (waits, safe_click, screenshots)          │
//! │    ├── HomePage                                             │
//! │    ├── SamplePage (login, registration, pizza order)        │
//! │    └── FormsPage  (form controls, uploads, download)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod config;
pub mod driver;
pub mod env_switch;
pub mod error;
pub mod locator;
pub mod pages;
pub mod provision;

pub use artifacts::ScreenshotStore;
pub use config::{Browser, SuiteConfig};
pub use driver::{BrowserSession, DriverEndpoint, DriverFactory, DriverService};
pub use env_switch::{Environment, EnvironmentSwitcher};
pub use error::{E2eError, E2eResult};
pub use locator::{Locator, LocatorKind, NamedLocator};
pub use provision::{BrowserVersion, DriverProvisioner, Platform};
