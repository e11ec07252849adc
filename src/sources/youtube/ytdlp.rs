use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use tokio::process::Command;

use super::{resolver::StreamFallback, utils::watch_url};
use crate::{common::types::AnyResult, configs::YtDlpConfig};

pub const FALLBACK_NAME: &str = "yt-dlp";

const BINARY_NAME: &str = "yt-dlp";
const COMMON_INSTALL_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

#[derive(Debug, thiserror::Error)]
pub enum YtDlpError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },
    #[error("yt-dlp timed out after {0}s")]
    Timeout(u64),
    #[error("yt-dlp exited with {code}: {stderr}")]
    Failed { code: String, stderr: String },
    #[error("yt-dlp returned no URL: {stderr}")]
    EmptyOutput { stderr: String },
}

/// Last-resort extractor that shells out to the `yt-dlp` CLI.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary: PathBuf,
    timeout: Duration,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &YtDlpConfig) -> Self {
        let binary = config
            .path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(discover_binary);
        Self::new(binary, Duration::from_secs(config.timeout_secs))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the binary runs at all (`yt-dlp --version` exits 0).
    pub async fn is_available(&self) -> bool {
        let probe = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(output)) if output.status.success() => {
                tracing::debug!(
                    "yt-dlp {} found at {}",
                    String::from_utf8_lossy(&output.stdout).trim(),
                    self.binary.display()
                );
                true
            }
            _ => false,
        }
    }

    pub async fn extract_url(&self, video_id: &str) -> Result<String, YtDlpError> {
        let child = Command::new(&self.binary)
            .args(["-f", "bestaudio", "--get-url", "--no-playlist", "--no-warnings"])
            .arg(watch_url(video_id))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        // Dropping the output future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| YtDlpError::Timeout(self.timeout.as_secs()))?
            .map_err(|source| YtDlpError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(YtDlpError::Failed { code, stderr });
        }

        first_url_line(&String::from_utf8_lossy(&output.stdout))
            .ok_or(YtDlpError::EmptyOutput { stderr })
    }
}

#[async_trait]
impl StreamFallback for YtDlpExtractor {
    fn name(&self) -> &str {
        FALLBACK_NAME
    }

    async fn extract(&self, video_id: &str) -> AnyResult<Option<String>> {
        Ok(Some(self.extract_url(video_id).await?))
    }
}

fn first_url_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Looks in the usual install locations first, then leaves it to `PATH`.
fn discover_binary() -> PathBuf {
    COMMON_INSTALL_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(BINARY_NAME))
        .find(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(BINARY_NAME))
}
