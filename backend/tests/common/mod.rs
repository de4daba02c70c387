#![allow(dead_code)]

use rocket::local::asynchronous::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use videograb_backend::error::ExtractorError;
use videograb_backend::services::extractor::{
    Downloader, MetadataFetcher, ProgressFn, RawFormat, RawVideoInfo,
};
use videograb_backend::services::{VideoService, VideoServiceConfig};
use videograb_backend::{build_rocket, AppState};

pub const INDEX_HTML: &str = "<!doctype html><title>VideoGrab</title>";

/// Extractor double that writes predictable bytes instead of fetching.
#[derive(Default)]
pub struct StubExtractor {
    pub fail_with: Option<String>,
    pub write_partial: bool,
    pub delay: Option<Duration>,
    pub metadata_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
}

impl StubExtractor {
    pub fn failing(message: &str) -> Self {
        StubExtractor {
            fail_with: Some(message.to_string()),
            write_partial: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        StubExtractor {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst) + self.download_calls.load(Ordering::SeqCst)
    }

    fn failure(&self) -> Option<ExtractorError> {
        self.fail_with.as_ref().map(|message| ExtractorError::Failed {
            status: Some(1),
            message: message.clone(),
        })
    }
}

pub fn media_bytes(url: &str) -> Vec<u8> {
    format!("stub media for {url}").into_bytes()
}

#[rocket::async_trait]
impl MetadataFetcher for StubExtractor {
    async fn fetch_metadata(&self, _url: &str) -> Result<RawVideoInfo, ExtractorError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure() {
            return Err(err);
        }

        Ok(RawVideoInfo {
            title: Some("Stub Video".to_string()),
            uploader: Some("Stub Channel".to_string()),
            duration: Some(125.0),
            view_count: Some(4200),
            thumbnail: Some("https://img.example.com/stub.jpg".to_string()),
            formats: vec![
                RawFormat {
                    format_id: "140".to_string(),
                    ext: Some("m4a".to_string()),
                    height: None,
                },
                RawFormat {
                    format_id: "22".to_string(),
                    ext: Some("mp4".to_string()),
                    height: Some(720),
                },
                RawFormat {
                    format_id: "137".to_string(),
                    ext: Some("mp4".to_string()),
                    height: Some(1080),
                },
            ],
        })
    }
}

#[rocket::async_trait]
impl Downloader for StubExtractor {
    async fn download(
        &self,
        url: &str,
        _format_id: &str,
        destination: &Path,
        progress: ProgressFn,
    ) -> Result<(), ExtractorError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.write_partial {
            let mut partial = destination.as_os_str().to_owned();
            partial.push(".part");
            tokio::fs::write(PathBuf::from(partial), b"partial").await?;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failure() {
            return Err(err);
        }

        progress(50.0);
        tokio::fs::write(destination, media_bytes(url)).await?;
        Ok(())
    }
}

pub struct TestApp {
    pub client: Client,
    pub extractor: Arc<StubExtractor>,
    pub download_dir: TempDir,
    pub static_dir: TempDir,
}

impl TestApp {
    pub fn downloaded_files(&self) -> Vec<String> {
        std::fs::read_dir(self.download_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

pub async fn spawn_app(extractor: StubExtractor) -> TestApp {
    spawn_app_with_timeout(extractor, Duration::from_secs(5)).await
}

pub async fn spawn_app_with_timeout(
    extractor: StubExtractor,
    download_timeout: Duration,
) -> TestApp {
    let download_dir = TempDir::new().unwrap();
    let static_dir = TempDir::new().unwrap();
    std::fs::write(static_dir.path().join("index.html"), INDEX_HTML).unwrap();

    let extractor = Arc::new(extractor);
    let video_service = VideoService::new(
        extractor.clone(),
        extractor.clone(),
        VideoServiceConfig {
            download_dir: download_dir.path().to_path_buf(),
            metadata_timeout: Duration::from_secs(5),
            download_timeout,
            max_concurrent_downloads: 2,
            job_retention: Duration::from_secs(3600),
        },
    );
    video_service.prepare().await.unwrap();

    let state = AppState {
        video_service,
        static_dir: static_dir.path().to_path_buf(),
    };
    let client = Client::tracked(build_rocket(rocket::build(), state))
        .await
        .unwrap();

    TestApp {
        client,
        extractor,
        download_dir,
        static_dir,
    }
}
