//! Environment Commands
//!
//! Switch the active `.env` file and show the resulting suite configuration.

use anyhow::{Context, Result};
use campsuite_e2e::{Environment, EnvironmentSwitcher, SuiteConfig};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::output::{print_error, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum EnvCommands {
    /// Copy `.env.<env>` onto `.env`
    Switch(SwitchArgs),

    /// Show the configuration the suite would run with
    Show,
}

#[derive(Args)]
pub struct SwitchArgs {
    /// Target environment (dev, qa, prod)
    pub env: Environment,

    /// Directory holding the `.env*` files
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// One configuration value for display
#[derive(Serialize, Clone)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
}

impl TableDisplay for ConfigEntry {
    fn headers() -> Vec<&'static str> {
        vec!["Setting", "Value"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.key.to_string(), self.value.clone()]
    }
}

pub async fn execute(cmd: EnvCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        EnvCommands::Switch(args) => execute_switch(args),
        EnvCommands::Show => execute_show(format),
    }
}

fn execute_switch(args: SwitchArgs) -> Result<()> {
    let switcher = EnvironmentSwitcher::new(&args.root);
    let active = match switcher.switch(args.env) {
        Ok(active) => active,
        Err(e) => {
            print_error(&format!("Failed to switch to {} environment: {}", args.env, e));
            return Err(e).with_context(|| format!("Failed to switch to {}", args.env));
        }
    };

    print_success(&format!("Switched to {} environment ({})", args.env, active.display()));
    Ok(())
}

fn execute_show(format: OutputFormat) -> Result<()> {
    let config = SuiteConfig::from_env().context("Failed to load configuration")?;
    print_list(&config_entries(&config), format);
    Ok(())
}

pub fn config_entries(config: &SuiteConfig) -> Vec<ConfigEntry> {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    vec![
        ConfigEntry { key: "TEST_ENV", value: config.test_env.clone() },
        ConfigEntry { key: "BASE_URL", value: config.base_url.clone() },
        ConfigEntry { key: "BROWSER", value: config.browser.clone() },
        ConfigEntry { key: "HEADLESS", value: config.headless.to_string() },
        ConfigEntry { key: "DEFAULT_TIMEOUT", value: format!("{}s", config.default_timeout_secs) },
        ConfigEntry { key: "EXPLICIT_TIMEOUT", value: format!("{}s", config.explicit_timeout_secs) },
        ConfigEntry { key: "WEBDRIVER_URL", value: optional(config.webdriver_url.clone()) },
        ConfigEntry {
            key: "CHROMEDRIVER_PATH",
            value: optional(config.chromedriver_path.as_ref().map(|p| p.display().to_string())),
        },
        ConfigEntry { key: "DRIVER_CACHE_DIR", value: config.driver_cache_dir.display().to_string() },
        ConfigEntry { key: "SCREENSHOT_DIR", value: config.screenshot_dir.display().to_string() },
        ConfigEntry { key: "DOWNLOAD_DIR", value: config.download_dir.display().to_string() },
        ConfigEntry { key: "REPORTS_DIR", value: config.reports_dir.display().to_string() },
        ConfigEntry { key: "CI", value: config.is_ci().to_string() },
    ]
}
