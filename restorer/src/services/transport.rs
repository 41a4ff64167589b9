// File: restorer/src/services/transport.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::commands::CommandRunner;
use crate::config::ArtifactConfig;

/// One way of getting a remote file onto local disk
#[async_trait]
pub trait ArtifactTransport: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    /// Downloads `url` into `dest`, returning the number of bytes on disk
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// In-process HTTP(S) client
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration, total_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(total_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArtifactTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn available(&self) -> bool {
        true
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed for {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!("GET {} returned {}", url, response.status()));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| anyhow!("Download of {} interrupted: {}", url, e))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTool {
    Wget,
    Curl,
}

impl DownloadTool {
    fn binary(&self) -> &'static str {
        match self {
            DownloadTool::Wget => "wget",
            DownloadTool::Curl => "curl",
        }
    }
}

/// Download through an external `wget` or `curl`
pub struct CommandTransport {
    runner: Arc<dyn CommandRunner>,
    tool: DownloadTool,
    connect_timeout: Duration,
    total_timeout: Duration,
}

impl CommandTransport {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        tool: DownloadTool,
        connect_timeout: Duration,
        total_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            tool,
            connect_timeout,
            total_timeout,
        }
    }

    fn arguments(&self, url: &str, dest: &str) -> Vec<String> {
        let connect = self.connect_timeout.as_secs().max(1).to_string();
        let total = self.total_timeout.as_secs().max(1).to_string();
        match self.tool {
            DownloadTool::Wget => vec![
                "-q".to_string(),
                format!("--timeout={}", connect),
                "--tries=1".to_string(),
                "-O".to_string(),
                dest.to_string(),
                url.to_string(),
            ],
            DownloadTool::Curl => vec![
                "-fsSL".to_string(),
                "--connect-timeout".to_string(),
                connect,
                "--max-time".to_string(),
                total,
                "-o".to_string(),
                dest.to_string(),
                url.to_string(),
            ],
        }
    }
}

#[async_trait]
impl ArtifactTransport for CommandTransport {
    fn name(&self) -> &str {
        self.tool.binary()
    }

    fn available(&self) -> bool {
        self.runner.tool_available(self.tool.binary())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let dest_str = dest.to_string_lossy();
        let args = self.arguments(url, &dest_str);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        // wget has no total deadline of its own
        let output = self
            .runner
            .run(self.tool.binary(), &args, self.total_timeout)
            .await?;

        if !output.success {
            return Err(anyhow!(
                "{} failed for {}: {}",
                self.tool.binary(),
                url,
                output.error_text()
            ));
        }

        let metadata = tokio::fs::metadata(dest)
            .await
            .with_context(|| format!("{} reported success but {} is missing", self.name(), dest.display()))?;
        Ok(metadata.len())
    }
}

/// HTTP client first, then `wget`, then `curl`
pub fn default_transports(
    config: &ArtifactConfig,
    runner: Arc<dyn CommandRunner>,
) -> Vec<Box<dyn ArtifactTransport>> {
    let mut transports: Vec<Box<dyn ArtifactTransport>> = Vec::new();

    match HttpTransport::new(config.connect_timeout(), config.total_timeout()) {
        Ok(http) => transports.push(Box::new(http)),
        Err(e) => warn!("HTTP transport unavailable: {}", e),
    }

    for tool in [DownloadTool::Wget, DownloadTool::Curl] {
        transports.push(Box::new(CommandTransport::new(
            runner.clone(),
            tool,
            config.connect_timeout(),
            config.total_timeout(),
        )));
    }

    debug!(
        "Configured transports: {}",
        transports.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    );
    transports
}

/// Joins the base location and a manifest filename with exactly one slash
pub fn artifact_url(base_url: &str, filename: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        filename.trim_start_matches('/')
    )
}
