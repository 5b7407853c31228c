//! Driver Commands
//!
//! Inspect the installed browser and provision a matching chromedriver.

use anyhow::{Context, Result};
use campsuite_e2e::provision::detect_browser_version;
use campsuite_e2e::{DriverEndpoint, DriverProvisioner, SuiteConfig};
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;

use crate::output::{print_item, print_success, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum DriverCommands {
    /// Show the installed browser version and the cache location for its driver
    Detect,

    /// Resolve and cache a chromedriver matching the installed browser
    Install,

    /// Start the driver service, wait until it reports ready, then stop it
    Check,
}

#[derive(Serialize, Clone)]
pub struct BrowserInfo {
    pub version: String,
    pub major: u32,
    pub platform: String,
    pub cached_driver: String,
    pub cached: bool,
}

impl TableDisplay for BrowserInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Browser Version", "Platform", "Cached Driver", "Present"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.version.clone(),
            self.platform.clone(),
            self.cached_driver.clone(),
            if self.cached { "yes".into() } else { "no".into() },
        ]
    }
}

pub async fn execute(cmd: DriverCommands, format: OutputFormat) -> Result<()> {
    let config = SuiteConfig::from_env().context("Failed to load configuration")?;

    match cmd {
        DriverCommands::Detect => execute_detect(&config, format).await,
        DriverCommands::Install => execute_install(&config).await,
        DriverCommands::Check => execute_check(&config).await,
    }
}

async fn execute_detect(config: &SuiteConfig, format: OutputFormat) -> Result<()> {
    let provisioner = DriverProvisioner::new(config)?;
    let version = detect_browser_version()
        .await
        .context("Could not detect an installed Chrome or Chromium")?;

    let cached = provisioner.cached_binary(version.major);
    let info = BrowserInfo {
        version: version.to_string(),
        major: version.major,
        platform: provisioner.platform().as_str().to_string(),
        cached: cached.is_file(),
        cached_driver: cached.display().to_string(),
    };

    print_item(&info, format);
    Ok(())
}

async fn execute_install(config: &SuiteConfig) -> Result<()> {
    println!("{} Resolving chromedriver...", "→".cyan());

    let path = DriverProvisioner::new(config)?
        .ensure_driver()
        .await
        .context("Driver provisioning failed")?;

    print_success(&format!("chromedriver ready at {}", path.display().to_string().bold()));
    Ok(())
}

async fn execute_check(config: &SuiteConfig) -> Result<()> {
    let mut endpoint = DriverEndpoint::start(config)
        .await
        .context("Driver service did not become ready")?;

    let kind = if endpoint.is_local() { "local" } else { "remote" };
    print_success(&format!("{} WebDriver reachable at {}", kind, endpoint.url().cyan()));

    endpoint.stop();
    Ok(())
}
