//! Screenshots and downloaded files

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thirtyfour::WebDriver;
use tracing::{debug, error, info};

use crate::error::{E2eError, E2eResult};

/// Directory screenshots are written to
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a screenshot name, with unsafe characters replaced
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", sanitize(name)))
    }

    /// `error_<name>_<YYYYmmdd_HHMMSS>`
    pub fn timestamped(name: &str) -> String {
        format!("error_{}_{}", name, chrono::Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Save a screenshot; failures are logged and yield `None`
    pub async fn capture(&self, driver: &WebDriver, name: &str) -> Option<PathBuf> {
        let path = self.path_for(name);

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            error!("Failed to take screenshot: {}", e);
            return None;
        }

        match driver.screenshot(&path).await {
            Ok(()) => {
                info!("Screenshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("Failed to take screenshot: {}", e);
                None
            }
        }
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// Await `fut`; if it fails, save `error_<name>_<timestamp>.png` and pass the error on
pub async fn capture_on_failure<T, F>(
    driver: &WebDriver,
    store: &ScreenshotStore,
    name: &str,
    fut: F,
) -> E2eResult<T>
where
    F: Future<Output = E2eResult<T>>,
{
    match fut.await {
        Ok(value) => Ok(value),
        Err(e) => {
            let shot = ScreenshotStore::timestamped(name);
            if let Some(path) = store.capture(driver, &shot).await {
                error!("Screenshot saved to {}", path.display());
            }
            Err(e)
        }
    }
}

/// Wait for `file_name` to appear in `dir`, polling once a second
pub async fn wait_for_download(dir: &Path, file_name: &str, timeout: Duration) -> E2eResult<PathBuf> {
    let path = dir.join(file_name);
    let start = Instant::now();

    loop {
        if path.is_file() {
            info!("File downloaded successfully: {}", path.display());
            return Ok(path);
        }
        if start.elapsed() >= timeout {
            error!(
                "File not found in downloads folder after {} seconds.",
                timeout.as_secs()
            );
            return Err(E2eError::timeout(format!("download of {}", file_name), timeout));
        }
        debug!("Waiting for {}", path.display());
        tokio::time::sleep(Duration::from_secs(1).min(timeout)).await;
    }
}
