use crate::error::ExtractorError;
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Receives download progress in percent.
pub type ProgressFn = Arc<dyn Fn(f32) + Send + Sync>;

/// Subset of the extractor's info JSON the service cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVideoInfo {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub formats: Vec<RawFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFormat {
    pub format_id: String,
    pub ext: Option<String>,
    pub height: Option<u32>,
}

#[rocket::async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Looks up metadata without fetching any media.
    async fn fetch_metadata(&self, url: &str) -> Result<RawVideoInfo, ExtractorError>;
}

#[rocket::async_trait]
pub trait Downloader: Send + Sync {
    /// Fetches `url` in the selected format and writes it to `destination`.
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        destination: &Path,
        progress: ProgressFn,
    ) -> Result<(), ExtractorError>;
}

/// Drives the `yt-dlp` executable. Children are killed when the calling
/// future is dropped, so callers can bound each call with a timeout.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> ExtractorError {
        ExtractorError::Spawn {
            program: self.binary.clone(),
            source,
        }
    }
}

#[rocket::async_trait]
impl MetadataFetcher for YtDlp {
    async fn fetch_metadata(&self, url: &str) -> Result<RawVideoInfo, ExtractorError> {
        debug!("Running {} metadata lookup for {url}", self.binary);

        let output = self
            .command()
            .args([
                "--dump-single-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                "--",
            ])
            .arg(url)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure_from(output.status.code(), &stderr));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[rocket::async_trait]
impl Downloader for YtDlp {
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        destination: &Path,
        progress: ProgressFn,
    ) -> Result<(), ExtractorError> {
        info!(
            "Downloading {url} (format {format_id}) to {}",
            destination.display()
        );

        let mut child = self
            .command()
            .arg("-f")
            .arg(format_id)
            .arg("-o")
            .arg(destination)
            .args([
                "--merge-output-format",
                "mp4",
                "--no-playlist",
                "--newline",
                "--no-warnings",
                "--",
            ])
            .arg(url)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Drained concurrently so a chatty stderr can never stall stdout.
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buffer = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut buffer).await;
            }
            buffer
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(percent) = parse_progress_line(&line) {
                    progress(percent);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(failure_from(status.code(), &stderr))
        }
    }
}

/// Extracts the percentage from a `[download]  42.0% of ...` line.
pub fn parse_progress_line(line: &str) -> Option<f32> {
    let rest = line.trim_start().strip_prefix("[download]")?;
    let token = rest.split_whitespace().next()?;
    let percent = token.strip_suffix('%')?.parse::<f32>().ok()?;
    (0.0..=100.0).contains(&percent).then_some(percent)
}

/// Keeps the `ERROR:` lines of the extractor's stderr, which carry the
/// message users need to see.
fn failure_from(status: Option<i32>, stderr: &str) -> ExtractorError {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();

    let message = if !errors.is_empty() {
        errors.join("\n")
    } else if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        match status {
            Some(code) => format!("Extractor exited with status {code}"),
            None => "Extractor was terminated by a signal".to_string(),
        }
    };

    ExtractorError::Failed { status, message }
}
