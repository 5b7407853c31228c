//! Switching between environment files

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{E2eError, E2eResult};

/// Target environments with their own `.env.*` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Qa,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Qa, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Prod => "prod",
        }
    }

    /// File holding this environment's variables
    pub fn env_file(&self) -> &'static str {
        match self {
            Environment::Dev => ".env.dev",
            Environment::Qa => ".env.qa",
            Environment::Prod => ".env.prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "qa" => Ok(Environment::Qa),
            "prod" => Ok(Environment::Prod),
            other => {
                error!("Invalid environment: {}", other);
                Err(E2eError::EnvSwitch(format!("invalid environment: {}", other)))
            }
        }
    }
}

/// Copies an environment file over the active `.env`
pub struct EnvironmentSwitcher {
    root: PathBuf,
}

impl EnvironmentSwitcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn active_file(&self) -> PathBuf {
        self.root.join(".env")
    }

    /// Make `env` the active environment
    pub fn switch(&self, env: Environment) -> E2eResult<PathBuf> {
        let source = self.root.join(env.env_file());
        let target = self.active_file();

        if !source.exists() {
            error!("Failed to switch environment: {} not found", source.display());
            return Err(E2eError::EnvSwitch(format!(
                "{} not found",
                source.display()
            )));
        }

        if same_file(&source, &target) {
            info!("{} is already the active environment file", source.display());
            return Ok(target);
        }

        std::fs::copy(&source, &target).map_err(|e| {
            error!("Failed to switch environment: {}", e);
            E2eError::EnvSwitch(format!("copy {}: {}", source.display(), e))
        })?;

        info!("Successfully switched to {} environment", env.as_str().to_uppercase());
        Ok(target)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
