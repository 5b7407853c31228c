//! Driver provisioning - matching a chromedriver binary to the installed browser
//!
//! Resolution order:
//! 1. an explicit `CHROMEDRIVER_PATH`
//! 2. a previously provisioned binary in the cache (`<cache>/<major>/chromedriver`)
//! 3. a `chromedriver` on `PATH` whose major version matches the browser
//! 4. a fresh download, trying each [`ResolveStrategy`] in turn

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use regex::Regex;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};

/// Browser binaries probed for a version, in order
pub const BROWSER_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

pub const MILESTONE_ENDPOINT: &str =
    "https://googlechromelabs.github.io/chrome-for-testing/latest-versions-per-milestone-with-downloads.json";

pub const DIRECT_DOWNLOAD_BASE: &str =
    "https://edgedl.me.gvt1.com/edgedl/chrome/chrome-for-testing";

/// A four-part Chrome version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub patch: u32,
}

impl BrowserVersion {
    /// Pull the first `a.b.c.d` out of `--version` output
    pub fn parse(output: &str) -> Option<Self> {
        let re = Regex::new(r"(\d+)\.(\d+)\.(\d+)\.(\d+)").ok()?;
        let caps = re.captures(output)?;
        let part = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
        Some(Self {
            major: part(1)?,
            minor: part(2)?,
            build: part(3)?,
            patch: part(4)?,
        })
    }
}

impl fmt::Display for BrowserVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.patch)
    }
}

/// Chrome-for-Testing platform identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux64,
    MacArm64,
    MacX64,
    Win64,
}

impl Platform {
    pub fn current() -> E2eResult<Self> {
        if cfg!(all(target_os = "linux", target_arch = "x86_64")) {
            Ok(Platform::Linux64)
        } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
            Ok(Platform::MacArm64)
        } else if cfg!(all(target_os = "macos", target_arch = "x86_64")) {
            Ok(Platform::MacX64)
        } else if cfg!(all(target_os = "windows", target_arch = "x86_64")) {
            Ok(Platform::Win64)
        } else {
            Err(E2eError::DriverResolution {
                version: "any".to_string(),
                reason: format!(
                    "no chromedriver builds for {}/{}",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                ),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux64 => "linux64",
            Platform::MacArm64 => "mac-arm64",
            Platform::MacX64 => "mac-x64",
            Platform::Win64 => "win64",
        }
    }

    pub fn binary_name(&self) -> &'static str {
        match self {
            Platform::Win64 => "chromedriver.exe",
            _ => "chromedriver",
        }
    }

    /// Directory the binary sits in inside the release zip
    pub fn archive_dir(&self) -> String {
        format!("chromedriver-{}", self.as_str())
    }
}

/// How a download URL is found for a browser version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Chrome-for-Testing per-milestone JSON index
    MilestoneEndpoint,
    /// Fixed URL pattern built from the full browser version
    DirectUrl,
}

impl ResolveStrategy {
    pub const ORDER: [ResolveStrategy; 2] =
        [ResolveStrategy::MilestoneEndpoint, ResolveStrategy::DirectUrl];
}

#[derive(Debug, Clone)]
pub struct DriverDownload {
    pub url: String,
    pub driver_version: String,
    pub strategy: ResolveStrategy,
}

#[derive(Debug, Deserialize)]
struct MilestoneIndex {
    milestones: HashMap<String, Milestone>,
}

#[derive(Debug, Deserialize)]
struct Milestone {
    version: String,
    #[serde(default)]
    downloads: MilestoneDownloads,
}

#[derive(Debug, Default, Deserialize)]
struct MilestoneDownloads {
    #[serde(default)]
    chromedriver: Vec<PlatformDownload>,
}

#[derive(Debug, Deserialize)]
struct PlatformDownload {
    platform: String,
    url: String,
}

/// Find the chromedriver download for `major` in a milestone index document
pub fn milestone_download(index: &str, major: u32, platform: Platform) -> E2eResult<DriverDownload> {
    let index: MilestoneIndex = serde_json::from_str(index)?;
    let milestone = index.milestones.get(&major.to_string()).ok_or_else(|| {
        E2eError::DriverResolution {
            version: major.to_string(),
            reason: "milestone not listed".to_string(),
        }
    })?;

    milestone
        .downloads
        .chromedriver
        .iter()
        .find(|d| d.platform == platform.as_str())
        .map(|d| DriverDownload {
            url: d.url.clone(),
            driver_version: milestone.version.clone(),
            strategy: ResolveStrategy::MilestoneEndpoint,
        })
        .ok_or_else(|| E2eError::DriverResolution {
            version: milestone.version.clone(),
            reason: format!("no chromedriver build for {}", platform.as_str()),
        })
}

pub fn direct_download(base: &str, version: &BrowserVersion, platform: Platform) -> DriverDownload {
    DriverDownload {
        url: format!(
            "{}/{}/{}/chromedriver-{}.zip",
            base.trim_end_matches('/'),
            version,
            platform.as_str(),
            platform.as_str()
        ),
        driver_version: version.to_string(),
        strategy: ResolveStrategy::DirectUrl,
    }
}

/// Locates, downloads and caches chromedriver binaries
pub struct DriverProvisioner {
    cache_dir: PathBuf,
    explicit: Option<PathBuf>,
    platform: Platform,
    client: reqwest::Client,
    milestone_endpoint: String,
    direct_base: String,
}

impl DriverProvisioner {
    pub fn new(config: &SuiteConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            cache_dir: config.driver_cache_dir.clone(),
            explicit: config.chromedriver_path.clone(),
            platform: Platform::current()?,
            client,
            milestone_endpoint: MILESTONE_ENDPOINT.to_string(),
            direct_base: DIRECT_DOWNLOAD_BASE.to_string(),
        })
    }

    /// Point resolution at different endpoints (mirrors, tests)
    pub fn with_endpoints(mut self, milestone_endpoint: impl Into<String>, direct_base: impl Into<String>) -> Self {
        self.milestone_endpoint = milestone_endpoint.into();
        self.direct_base = direct_base.into();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Cache location for a browser major version
    pub fn cached_binary(&self, major: u32) -> PathBuf {
        self.cache_dir
            .join(major.to_string())
            .join(self.platform.binary_name())
    }

    /// Return a driver binary that matches the installed browser
    pub async fn ensure_driver(&self) -> E2eResult<PathBuf> {
        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(E2eError::Config(format!(
                    "CHROMEDRIVER_PATH {} does not exist",
                    path.display()
                )));
            }
            info!("Using configured chromedriver: {}", path.display());
            return Ok(path.clone());
        }

        let version = detect_browser_version().await?;
        info!("Detected browser version {}", version);

        let cached = self.cached_binary(version.major);
        if cached.is_file() {
            info!("Using cached chromedriver: {}", cached.display());
            return Ok(cached);
        }

        if let Some(on_path) = find_on_path(self.platform.binary_name()) {
            match driver_major_version(&on_path).await {
                Some(major) if major == version.major => {
                    info!("Using chromedriver from PATH: {}", on_path.display());
                    return Ok(on_path);
                }
                Some(major) => debug!(
                    "chromedriver on PATH is for {}, browser is {}",
                    major, version.major
                ),
                None => debug!("Could not read version of {}", on_path.display()),
            }
        }

        self.download_for(&version).await
    }

    /// Try each strategy until one yields an installed binary
    pub async fn download_for(&self, version: &BrowserVersion) -> E2eResult<PathBuf> {
        let mut last_error = None;

        for strategy in ResolveStrategy::ORDER {
            let attempt = match self.resolve(strategy, version).await {
                Ok(download) => self.install(&download, version.major).await,
                Err(e) => Err(e),
            };

            match attempt {
                Ok(path) => return Ok(path),
                Err(e) => {
                    warn!("Driver resolution via {:?} failed: {}", strategy, e);
                    last_error = Some(e);
                }
            }
        }

        Err(E2eError::DriverResolution {
            version: version.to_string(),
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no strategies available".to_string()),
        })
    }

    pub async fn resolve(&self, strategy: ResolveStrategy, version: &BrowserVersion) -> E2eResult<DriverDownload> {
        match strategy {
            ResolveStrategy::MilestoneEndpoint => {
                debug!("Fetching milestone index from {}", self.milestone_endpoint);
                let resp = self.client.get(&self.milestone_endpoint).send().await?;
                if !resp.status().is_success() {
                    return Err(E2eError::DriverResolution {
                        version: version.to_string(),
                        reason: format!("milestone index returned {}", resp.status()),
                    });
                }
                let body = resp.text().await?;
                milestone_download(&body, version.major, self.platform)
            }
            ResolveStrategy::DirectUrl => Ok(direct_download(&self.direct_base, version, self.platform)),
        }
    }

    /// Download, extract and cache a driver archive
    async fn install(&self, download: &DriverDownload, major: u32) -> E2eResult<PathBuf> {
        info!("Downloading ChromeDriver from: {}", download.url);

        let resp = self.client.get(&download.url).send().await?;
        if !resp.status().is_success() {
            return Err(E2eError::DriverDownload {
                url: download.url.clone(),
                reason: format!("HTTP {}", resp.status()),
            });
        }
        let bytes = resp.bytes().await?;

        let temp_dir = tempfile::tempdir()?;
        let archive_path = temp_dir.path().join("chromedriver.zip");
        std::fs::write(&archive_path, &bytes)?;

        let extracted = extract_driver(&archive_path, temp_dir.path(), self.platform)?;

        let target = self.cached_binary(major);
        let cache_slot = target
            .parent()
            .ok_or_else(|| E2eError::DriverArchive(format!("no cache directory for {}", target.display())))?;
        std::fs::create_dir_all(cache_slot)?;

        // Stage next to the target so the rename never crosses filesystems
        let mut staged = tempfile::NamedTempFile::new_in(cache_slot)?;
        std::io::copy(&mut File::open(&extracted)?, staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        make_executable(staged.path())?;
        staged.persist(&target).map_err(|e| e.error)?;

        info!(
            "Installed chromedriver {} at {}",
            download.driver_version,
            target.display()
        );
        Ok(target)
    }
}

/// Extract the driver binary from a release zip into `dest`
pub fn extract_driver(archive: &Path, dest: &Path, platform: Platform) -> E2eResult<PathBuf> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    let names: Vec<String> = zip.file_names().map(String::from).collect();

    if let Some(bad) = names.iter().find(|n| n.contains("..")) {
        return Err(E2eError::DriverArchive(format!("path traversal in entry {}", bad)));
    }

    let binary = platform.binary_name();
    let expected = format!("{}/{}", platform.archive_dir(), binary);
    let entry_name = names
        .iter()
        .find(|n| **n == expected)
        .or_else(|| {
            names
                .iter()
                .find(|n| Path::new(n.as_str()).file_name().map(|f| f == binary).unwrap_or(false))
        })
        .cloned()
        .ok_or_else(|| E2eError::DriverArchive(format!("{} not found in archive", expected)))?;

    if entry_name != expected {
        debug!("Using archive entry {} (expected {})", entry_name, expected);
    }

    let out_path = dest.join(binary);
    {
        let mut entry = zip.by_name(&entry_name)?;
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
    }
    make_executable(&out_path)?;

    Ok(out_path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> E2eResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> E2eResult<()> {
    Ok(())
}

/// Run the candidate browsers with `--version` until one answers
pub async fn detect_browser_version() -> E2eResult<BrowserVersion> {
    let mut tried = Vec::new();

    for candidate in BROWSER_CANDIDATES {
        let output = match Command::new(candidate).arg("--version").output().await {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tried.push(format!("{} exited with {}", candidate, output.status));
                continue;
            }
            Err(e) => {
                tried.push(format!("{}: {}", candidate, e));
                continue;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(version) = BrowserVersion::parse(&stdout) {
            debug!("{} reports version {}", candidate, version);
            return Ok(version);
        }
        tried.push(format!("{}: unrecognised output '{}'", candidate, stdout.trim()));
    }

    Err(E2eError::BrowserVersion(tried.join("; ")))
}

async fn driver_major_version(binary: &Path) -> Option<u32> {
    let output = Command::new(binary).arg("--version").output().await.ok()?;
    BrowserVersion::parse(&String::from_utf8_lossy(&output.stdout)).map(|v| v.major)
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use zip::write::SimpleFileOptions;

    const INDEX: &str = r#"{
        "timestamp": "2024-01-10T12:00:00.000Z",
        "milestones": {
            "120": {
                "milestone": "120",
                "version": "120.0.6099.109",
                "revision": "1217362",
                "downloads": {
                    "chrome": [
                        { "platform": "linux64", "url": "https://example.test/chrome-linux64.zip" }
                    ],
                    "chromedriver": [
                        { "platform": "linux64", "url": "https://example.test/120/chromedriver-linux64.zip" },
                        { "platform": "mac-arm64", "url": "https://example.test/120/chromedriver-mac-arm64.zip" }
                    ]
                }
            },
            "113": {
                "milestone": "113",
                "version": "113.0.5672.63",
                "revision": "1121455",
                "downloads": {}
            }
        }
    }"#;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn zip_bytes(name: &str, data: &[u8]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Answer every HTTP request with `body`; returns the base URL
    async fn serve_archive(body: Vec<u8>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(&body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_parse_chrome_version_output() {
        let v = BrowserVersion::parse("Google Chrome 120.0.6099.109 \n").unwrap();
        assert_eq!(v.major, 120);
        assert_eq!(v.to_string(), "120.0.6099.109");

        let v = BrowserVersion::parse("Chromium 119.0.6045.159 built on Debian 12.2").unwrap();
        assert_eq!(v.major, 119);

        assert!(BrowserVersion::parse("Google Chrome").is_none());
    }

    #[test]
    fn test_milestone_download_picks_platform() {
        let dl = milestone_download(INDEX, 120, Platform::MacArm64).unwrap();
        assert_eq!(dl.url, "https://example.test/120/chromedriver-mac-arm64.zip");
        assert_eq!(dl.driver_version, "120.0.6099.109");
        assert_eq!(dl.strategy, ResolveStrategy::MilestoneEndpoint);
    }

    #[test]
    fn test_milestone_without_driver_builds() {
        let err = milestone_download(INDEX, 113, Platform::Linux64).unwrap_err();
        assert!(matches!(err, E2eError::DriverResolution { .. }));

        let err = milestone_download(INDEX, 99, Platform::Linux64).unwrap_err();
        assert!(err.to_string().contains("milestone not listed"));
    }

    #[test]
    fn test_direct_download_url() {
        let version = BrowserVersion::parse("120.0.6099.109").unwrap();
        let dl = direct_download(DIRECT_DOWNLOAD_BASE, &version, Platform::Linux64);
        assert_eq!(
            dl.url,
            "https://edgedl.me.gvt1.com/edgedl/chrome/chrome-for-testing/120.0.6099.109/linux64/chromedriver-linux64.zip"
        );
    }

    #[test]
    fn test_extract_driver_makes_binary_executable() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("driver.zip");
        write_zip(
            &archive,
            &[
                ("chromedriver-linux64/LICENSE.chromedriver", b"license"),
                ("chromedriver-linux64/chromedriver", b"#!/bin/sh\necho ChromeDriver\n"),
            ],
        );

        let out = extract_driver(&archive, dir.path(), Platform::Linux64).unwrap();
        assert_eq!(out, dir.path().join("chromedriver"));
        assert_eq!(
            std::fs::read(&out).unwrap(),
            b"#!/bin/sh\necho ChromeDriver\n".to_vec()
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&out).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_extract_driver_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../chromedriver", b"x")]);

        let err = extract_driver(&archive, dir.path(), Platform::Linux64).unwrap_err();
        assert!(matches!(err, E2eError::DriverArchive(_)));
    }

    #[test]
    fn test_extract_driver_missing_binary() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("empty.zip");
        write_zip(&archive, &[("chromedriver-linux64/README", b"nothing here")]);

        let err = extract_driver(&archive, dir.path(), Platform::Linux64).unwrap_err();
        assert!(err.to_string().contains("chromedriver-linux64/chromedriver"));
    }

    #[tokio::test]
    async fn test_explicit_driver_path_is_used() {
        let dir = TempDir::new().unwrap();
        let driver = dir.path().join("chromedriver");
        std::fs::write(&driver, b"stub").unwrap();

        let config = SuiteConfig {
            chromedriver_path: Some(driver.clone()),
            driver_cache_dir: dir.path().join("cache"),
            ..Default::default()
        };
        let provisioner = match DriverProvisioner::new(&config) {
            Ok(p) => p,
            // No chromedriver builds for this host
            Err(E2eError::DriverResolution { .. }) => return,
            Err(e) => panic!("unexpected error: {}", e),
        };

        assert_eq!(provisioner.ensure_driver().await.unwrap(), driver);
        assert_eq!(
            provisioner.cached_binary(120),
            dir.path().join("cache").join("120").join(provisioner.platform().binary_name())
        );
    }

    #[tokio::test]
    async fn test_download_falls_through_every_strategy() {
        let dir = TempDir::new().unwrap();
        let config = SuiteConfig {
            driver_cache_dir: dir.path().join("cache"),
            ..Default::default()
        };
        let provisioner = match DriverProvisioner::new(&config) {
            Ok(p) => p.with_endpoints("http://127.0.0.1:1/index.json", "http://127.0.0.1:1"),
            Err(E2eError::DriverResolution { .. }) => return,
            Err(e) => panic!("unexpected error: {}", e),
        };

        let version = BrowserVersion::parse("120.0.6099.109").unwrap();
        let err = provisioner.download_for(&version).await.unwrap_err();
        match err {
            E2eError::DriverResolution { version, .. } => assert_eq!(version, "120.0.6099.109"),
            other => panic!("unexpected error: {}", other),
        }
        assert!(!provisioner.cached_binary(120).exists());
    }

    #[tokio::test]
    async fn test_direct_url_installs_when_milestone_endpoint_fails() {
        let dir = TempDir::new().unwrap();
        let config = SuiteConfig {
            driver_cache_dir: dir.path().join("cache"),
            ..Default::default()
        };
        let provisioner = match DriverProvisioner::new(&config) {
            Ok(p) => p,
            Err(E2eError::DriverResolution { .. }) => return,
            Err(e) => panic!("unexpected error: {}", e),
        };

        let platform = provisioner.platform();
        let driver = b"#!/bin/sh\necho ChromeDriver 120.0.6099.109\n";
        let entry = format!("{}/{}", platform.archive_dir(), platform.binary_name());
        let base = serve_archive(zip_bytes(&entry, driver)).await;
        let provisioner = provisioner.with_endpoints("http://127.0.0.1:1/index.json", base);

        let version = BrowserVersion::parse("120.0.6099.109").unwrap();
        let installed = provisioner.download_for(&version).await.unwrap();

        assert_eq!(installed, dir.path().join("cache").join("120").join(platform.binary_name()));
        assert_eq!(std::fs::read(&installed).unwrap(), driver.to_vec());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&installed).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        // Nothing but the binary is left in the cache slot
        let slot: Vec<_> = std::fs::read_dir(dir.path().join("cache").join("120"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(slot, vec![std::ffi::OsString::from(platform.binary_name())]);
    }
}
