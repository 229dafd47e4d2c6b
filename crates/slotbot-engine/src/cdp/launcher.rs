//! Chrome process launcher.
//!
//! One Chrome process per worker, bound to that worker's persistent
//! profile directory so login state survives session recreation.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use slotbot_config::BrowserConfig;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use super::error::CdpError;

/// A Chrome process owned by one worker session.
pub struct ChromeProcess {
    child: Child,
    endpoint: String,
}

impl ChromeProcess {
    /// Launch Chrome with remote debugging on a free local port, using the
    /// given profile directory, and wait until the endpoint answers.
    pub async fn launch(config: &BrowserConfig, profile_dir: &Path) -> Result<Self, CdpError> {
        let chrome_path = match &config.chrome_path {
            Some(path) => path.clone(),
            None => Self::find_chrome().ok_or(CdpError::ChromeNotFound)?,
        };

        if let Err(e) = std::fs::create_dir_all(profile_dir) {
            return Err(CdpError::LaunchFailed(format!(
                "cannot create profile dir {}: {}",
                profile_dir.display(),
                e
            )));
        }

        let port = free_port()?;
        let endpoint = format!("http://127.0.0.1:{}", port);

        info!(
            "Launching Chrome on port {} with profile at {}",
            port,
            profile_dir.display()
        );

        let mut cmd = Command::new(&chrome_path);
        cmd.arg(format!("--remote-debugging-port={}", port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!(
                "--window-size={},{}",
                config.window_width, config.window_height
            ))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        if config.headless {
            cmd.arg("--headless=new");
        }

        if config.block_images {
            cmd.arg("--blink-settings=imagesEnabled=false");
        }

        let child = cmd
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(e.to_string()))?;

        let process = Self { child, endpoint };
        process.wait_until_reachable().await?;
        Ok(process)
    }

    /// CDP debugging endpoint of this process.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn wait_until_reachable(&self) -> Result<(), CdpError> {
        let version_url = format!("{}/json/version", self.endpoint);
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if reqwest::get(&version_url).await.is_ok() {
                return Ok(());
            }
        }
        Err(CdpError::LaunchFailed(
            "Chrome failed to start within timeout".to_string(),
        ))
    }

    /// Kill the Chrome process.
    pub async fn shutdown(&mut self) {
        info!("Shutting down Chrome at {}", self.endpoint);
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill Chrome: {}", e);
        }
    }

    /// Find Chrome executable path.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }
}

/// Bind to port 0, read the assigned port, release it for Chrome.
///
/// The gap between release and Chrome binding is a real race, but ports
/// freed this way are not reassigned immediately on any supported OS.
fn free_port() -> Result<u16, CdpError> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|e| CdpError::LaunchFailed(format!("no free port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| CdpError::LaunchFailed(e.to_string()))?
        .port();
    Ok(port)
}
