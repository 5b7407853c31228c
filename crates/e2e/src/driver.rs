//! Browser driver management - the local chromedriver service and WebDriver sessions

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use serde::Deserialize;
use thirtyfour::prelude::*;
use thirtyfour::{ChromeCapabilities, ChromiumLikeCapabilities};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{Browser, SuiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::provision::DriverProvisioner;

const FULL_WIDTH: u32 = 1920;
const FULL_HEIGHT: u32 = 1080;

/// Handle to a running chromedriver process
pub struct DriverService {
    child: Child,
    url: String,
    port: u16,
}

impl DriverService {
    /// Spawn a driver binary and wait until it reports ready
    pub async fn spawn(binary: &Path, startup_timeout: Duration) -> E2eResult<Self> {
        let port = find_free_port()?;
        let url = format!("http://127.0.0.1:{}", port);

        info!("Starting {} on port {}", binary.display(), port);

        let child = Command::new(binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                E2eError::DriverStartup(format!("failed to spawn {}: {}", binary.display(), e))
            })?;

        let service = DriverService { child, url, port };
        service.wait_for_ready(startup_timeout).await?;

        info!("Driver is ready at {}", service.url);
        Ok(service)
    }

    /// Poll `/status` until the driver accepts sessions
    async fn wait_for_ready(&self, timeout: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    match resp.json::<DriverStatus>().await {
                        Ok(status) if status.value.ready => return Ok(()),
                        Ok(status) => debug!("Driver not ready yet: {}", status.value.message),
                        Err(e) => warn!("Unreadable driver status: {}", e),
                    }
                }
                Ok(resp) => {
                    warn!("Driver status returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for driver to start...");
                    }
                    // Connection refused is expected while the driver is starting
                    if !e.is_connect() {
                        warn!("Driver status error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn stop(&mut self) -> E2eResult<()> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("Driver already exited: {}", status);
            return Ok(());
        }
        debug!("Stopping driver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverService {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[derive(Debug, Deserialize)]
struct DriverStatus {
    value: DriverStatusValue,
}

#[derive(Debug, Deserialize)]
struct DriverStatusValue {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    message: String,
}

/// Where sessions are created: a remote WebDriver or a local service we own
pub struct DriverEndpoint {
    url: String,
    service: Option<DriverService>,
}

impl DriverEndpoint {
    /// Use `WEBDRIVER_URL` if configured, otherwise provision and start chromedriver
    pub async fn start(config: &SuiteConfig) -> E2eResult<Self> {
        config.browser()?;

        if let Some(url) = &config.webdriver_url {
            info!("Using remote WebDriver at {}", url);
            return Ok(Self {
                url: url.clone(),
                service: None,
            });
        }

        let binary: PathBuf = DriverProvisioner::new(config)?.ensure_driver().await?;
        let service = DriverService::spawn(&binary, config.explicit_timeout()).await?;
        debug!("chromedriver listening on port {}", service.port());

        Ok(Self {
            url: service.url().to_string(),
            service: Some(service),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_local(&self) -> bool {
        self.service.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(mut service) = self.service.take() {
            if let Err(e) = service.stop() {
                error!("Error stopping driver: {}", e);
            }
        }
    }
}

/// Builds browser capabilities and opens sessions
pub struct DriverFactory {
    headless: bool,
    ci: bool,
    headless_mode: bool,
    download_dir: PathBuf,
}

impl DriverFactory {
    pub fn new(config: &SuiteConfig) -> E2eResult<Self> {
        match config.browser()? {
            Browser::Chrome => {}
        }

        Ok(Self {
            headless: config.headless,
            ci: config.is_ci(),
            headless_mode: config.effective_headless(),
            download_dir: config.download_dir.clone(),
        })
    }

    /// Browser command-line arguments, in order, without duplicates
    pub fn chrome_arguments(&self) -> Vec<String> {
        let mut args: Vec<&str> = vec![
            "--start-maximized",
            "--disable-extensions",
            "--disable-popup-blocking",
        ];

        if self.headless {
            args.push("--headless=new");
        }

        if self.ci {
            args.extend([
                "--no-sandbox",
                "--headless=new",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--window-size=1920,1080",
            ]);
        } else {
            args.extend(["--start-maximized", "--window-size=1920,1080"]);
        }

        let mut seen = std::collections::HashSet::new();
        args.into_iter()
            .filter(|a| seen.insert(*a))
            .map(String::from)
            .collect()
    }

    pub fn capabilities(&self) -> E2eResult<ChromeCapabilities> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in self.chrome_arguments() {
            caps.add_arg(&arg)?;
        }

        std::fs::create_dir_all(&self.download_dir)?;
        let download_dir = self
            .download_dir
            .canonicalize()
            .unwrap_or_else(|_| self.download_dir.clone());
        caps.add_experimental_option(
            "prefs",
            serde_json::json!({
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
                "safebrowsing.enabled": true,
            }),
        )?;

        Ok(caps)
    }

    fn mode(&self) -> &'static str {
        if self.headless_mode {
            "headless"
        } else {
            "normal"
        }
    }

    /// Open a new browser session against `server_url`
    pub async fn create(&self, server_url: &str) -> E2eResult<BrowserSession> {
        if self.ci {
            info!("Running in GitHub Actions - configuring for CI/CD");
        } else {
            info!("Running in local environment");
        }

        let driver = WebDriver::new(server_url, self.capabilities()?)
            .await
            .map_err(|e| {
                error!("Failed to create driver: {}", e);
                e
            })?;

        if !self.headless_mode {
            if let Err(e) = self.fit_window(&driver).await {
                warn!("Window management failed: {}", e);
            }
        }

        info!("Created Chrome driver in {} mode", self.mode());
        Ok(BrowserSession { driver })
    }

    async fn fit_window(&self, driver: &WebDriver) -> E2eResult<()> {
        driver.maximize_window().await?;

        let rect = driver.get_window_rect().await?;
        info!("Window size: {}x{}", rect.width, rect.height);

        if (rect.width as i64) < FULL_WIDTH as i64 {
            driver
                .set_window_rect(0, 0, FULL_WIDTH, FULL_HEIGHT)
                .await?;
            info!("Window size adjusted to {}x{}", FULL_WIDTH, FULL_HEIGHT);
        }
        Ok(())
    }
}

/// An open browser session
pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// End the session; failures are logged, not returned
    pub async fn quit(self) {
        if let Err(e) = self.driver.quit().await {
            error!("Error closing browser: {}", e);
        }
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession").finish_non_exhaustive()
    }
}

fn find_free_port() -> E2eResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|e| E2eError::DriverStartup(format!("no free port: {}", e)))?;
    Ok(listener.local_addr()?.port())
}
