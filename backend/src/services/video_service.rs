use crate::error::{ExtractorError, VideoError};
use crate::models::{
    DownloadResponse, EncodingOption, JobStatus, SupportedSite, VideoJob, VideoMetadata,
};
use crate::services::extractor::{Downloader, MetadataFetcher, ProgressFn, RawVideoInfo};
use crate::services::job_store::JobStore;
use crate::utils::{job_id_prefix, normalize_format, parse_generated_filename, validate_source_url};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use uuid::Uuid;

const SUPPORTED_SITES: &[(&str, &str, &str)] = &[
    ("YouTube", "youtube.com", "Limited (bot detection)"),
    ("Vimeo", "vimeo.com", "Supported"),
    ("Dailymotion", "dailymotion.com", "Supported"),
    ("TikTok", "tiktok.com", "Supported"),
    ("Twitter / X", "x.com", "Supported"),
    ("Instagram", "instagram.com", "Limited (login may be required)"),
    ("Facebook", "facebook.com", "Limited (public videos only)"),
    ("Reddit", "reddit.com", "Supported"),
    ("Twitch", "twitch.tv", "Supported"),
    ("SoundCloud", "soundcloud.com", "Supported"),
];

#[derive(Debug, Clone)]
pub struct VideoServiceConfig {
    pub download_dir: PathBuf,
    pub metadata_timeout: Duration,
    pub download_timeout: Duration,
    pub max_concurrent_downloads: usize,
    pub job_retention: Duration,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GarbageReport {
    pub jobs_removed: usize,
    pub files_removed: usize,
}

/// Runs info lookups and downloads against the extraction adapter and
/// tracks every download in the job store. Cheap to clone.
#[derive(Clone)]
pub struct VideoService {
    fetcher: Arc<dyn MetadataFetcher>,
    downloader: Arc<dyn Downloader>,
    jobs: Arc<JobStore>,
    permits: Arc<Semaphore>,
    config: Arc<VideoServiceConfig>,
}

impl VideoService {
    pub fn new(
        fetcher: Arc<dyn MetadataFetcher>,
        downloader: Arc<dyn Downloader>,
        config: VideoServiceConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1)));
        VideoService {
            fetcher,
            downloader,
            jobs: Arc::new(JobStore::new()),
            permits,
            config: Arc::new(config),
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// Creates the download directory.
    pub async fn prepare(&self) -> Result<(), VideoError> {
        tokio::fs::create_dir_all(&self.config.download_dir)
            .await
            .map_err(|e| {
                VideoError::Internal(format!(
                    "Failed to create download directory '{}': {e}",
                    self.config.download_dir.display()
                ))
            })
    }

    pub async fn get_metadata(&self, url: Option<&str>) -> Result<VideoMetadata, VideoError> {
        let url = validate_source_url(url)?;
        info!("Fetching video info for {url}");

        let raw = match timeout(self.config.metadata_timeout, self.fetcher.fetch_metadata(&url)).await
        {
            Ok(result) => result.map_err(VideoError::Extraction)?,
            Err(_) => {
                return Err(VideoError::Extraction(ExtractorError::Timeout(
                    self.config.metadata_timeout,
                )))
            }
        };

        Ok(into_metadata(raw))
    }

    /// Downloads while the caller waits. `download_timeout` covers the wait
    /// for a slot plus the download itself. The work runs in a spawned task,
    /// so it finishes and stays pollable even if the caller goes away.
    pub async fn start_download(
        &self,
        url: Option<&str>,
        format_id: Option<&str>,
    ) -> Result<DownloadResponse, VideoError> {
        let url = validate_source_url(url)?;
        let format_id = normalize_format(format_id);

        let job = self
            .jobs
            .create(url, format_id)
            .ok_or_else(|| VideoError::Internal("Job store is unavailable".to_string()))?;

        let job = self
            .spawn_job(job.id, Some(Instant::now() + self.config.download_timeout))
            .await
            .map_err(|e| VideoError::Internal(format!("Download task failed: {e}")))??;

        Ok(DownloadResponse::for_filename(&job.filename))
    }

    /// Registers a background download and returns right away. A request
    /// for a URL and format that is already in flight joins that job.
    pub fn submit_job(
        &self,
        url: Option<&str>,
        format_id: Option<&str>,
    ) -> Result<VideoJob, VideoError> {
        let url = validate_source_url(url)?;
        let format_id = normalize_format(format_id);

        let (job, created) = self
            .jobs
            .create_or_join(url, format_id)
            .ok_or_else(|| VideoError::Internal("Job store is unavailable".to_string()))?;

        if created {
            info!("Queued job {} for {} ({})", job.id, job.url, job.format_id);
            self.spawn_job(job.id, None);
        } else {
            info!("Joined in-flight job {} for {}", job.id, job.url);
        }

        Ok(job)
    }

    pub fn job(&self, id: &str) -> Result<VideoJob, VideoError> {
        Uuid::parse_str(id)
            .ok()
            .and_then(|id| self.jobs.get(&id))
            .ok_or_else(|| VideoError::NotFound("Job not found".to_string()))
    }

    pub fn list_jobs(&self) -> Vec<VideoJob> {
        self.jobs.list()
    }

    /// Maps a generated filename to the file of its completed job.
    pub async fn resolve_stream(&self, filename: &str) -> Result<PathBuf, VideoError> {
        let not_found = || VideoError::NotFound("File not found".to_string());

        let id = parse_generated_filename(filename).ok_or_else(not_found)?;
        let path = self
            .jobs
            .get(&id)
            .filter(|job| job.status == JobStatus::Complete && job.filename == filename)
            .and_then(|job| job.file_path)
            .ok_or_else(not_found)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => {
                warn!("Completed job {id} lost its file {}", path.display());
                Err(not_found())
            }
        }
    }

    /// Drops expired jobs with their files, then deletes orphaned files
    /// that no job references anymore.
    pub async fn collect_garbage(&self) -> GarbageReport {
        let retention = chrono::Duration::from_std(self.config.job_retention)
            .unwrap_or_else(|_| chrono::Duration::weeks(52));

        let expired = self.jobs.collect_garbage(retention);
        let mut report = GarbageReport {
            jobs_removed: expired.len(),
            files_removed: 0,
        };
        for job in &expired {
            report.files_removed += self.remove_job_files(&job.id).await;
        }
        report.files_removed += self.remove_orphans().await;

        if report != GarbageReport::default() {
            info!(
                "Cleanup removed {} jobs and {} files",
                report.jobs_removed, report.files_removed
            );
        }
        report
    }

    fn spawn_job(
        &self,
        id: Uuid,
        deadline: Option<Instant>,
    ) -> JoinHandle<Result<VideoJob, VideoError>> {
        let service = self.clone();
        tokio::spawn(async move { service.run_job(id, deadline).await })
    }

    /// Waits for a download slot, then runs the adapter. A `deadline`
    /// bounds the slot wait and the download together; without one the job
    /// stays `pending` as long as it takes and the adapter alone gets
    /// `download_timeout`.
    async fn run_job(&self, id: Uuid, deadline: Option<Instant>) -> Result<VideoJob, VideoError> {
        let limit = self.config.download_timeout;
        let acquire = self.permits.acquire();
        let permit = match deadline {
            Some(deadline) => match timeout_at(deadline, acquire).await {
                Ok(permit) => permit,
                Err(_) => {
                    let e = ExtractorError::Timeout(limit);
                    warn!("Job {id} got no download slot within {limit:?}");
                    self.jobs.mark_failed(&id, e.to_string());
                    return Err(VideoError::Download(e));
                }
            },
            None => acquire.await,
        };
        let _permit =
            permit.map_err(|_| VideoError::Internal("Download pool is closed".to_string()))?;
        let deadline = deadline.unwrap_or_else(|| Instant::now() + limit);

        let job = self
            .jobs
            .mark_downloading(&id)
            .ok_or_else(|| VideoError::NotFound("Job not found".to_string()))?;
        let destination = self.config.download_dir.join(&job.filename);

        let progress: ProgressFn = {
            let jobs = self.jobs.clone();
            Arc::new(move |percent| {
                jobs.update_progress(&id, percent);
            })
        };

        let download = self
            .downloader
            .download(&job.url, &job.format_id, &destination, progress);
        let outcome = match timeout_at(deadline, download).await {
            Ok(Ok(())) => verify_output(&destination).await,
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ExtractorError::Timeout(limit)),
        };

        match outcome {
            Ok(()) => {
                info!("Job {id} finished: {}", destination.display());
                self.jobs
                    .mark_complete(&id, destination)
                    .ok_or_else(|| VideoError::NotFound("Job not found".to_string()))
            }
            Err(e) => {
                error!("Job {id} failed: {e}");
                let removed = self.remove_job_files(&id).await;
                if removed > 0 {
                    info!("Removed {removed} partial files of job {id}");
                }
                self.jobs.mark_failed(&id, e.to_string());
                Err(VideoError::Download(e))
            }
        }
    }

    /// Deletes every file in the download directory that belongs to `id`.
    async fn remove_job_files(&self, id: &Uuid) -> usize {
        self.remove_files_where(|name, _| job_id_prefix(name) == Some(*id))
            .await
    }

    async fn remove_orphans(&self) -> usize {
        let retention = self.config.job_retention;
        let jobs = self.jobs.clone();
        self.remove_files_where(move |name, modified| {
            let Some(id) = job_id_prefix(name) else {
                return false;
            };
            let age = modified
                .and_then(|t| SystemTime::now().duration_since(t).ok())
                .unwrap_or_default();
            !jobs.contains(&id) && age > retention
        })
        .await
    }

    async fn remove_files_where<F>(&self, matches: F) -> usize
    where
        F: Fn(&str, Option<SystemTime>) -> bool,
    {
        let mut entries = match tokio::fs::read_dir(&self.config.download_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to read download directory '{}': {e}",
                    self.config.download_dir.display()
                );
                return 0;
            }
        };

        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let modified = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta.modified().ok(),
                _ => continue,
            };
            if !matches(name, modified) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove '{}': {e}", entry.path().display()),
            }
        }
        removed
    }
}

pub fn supported_sites() -> Vec<SupportedSite> {
    SUPPORTED_SITES
        .iter()
        .map(|(name, domain, status)| SupportedSite {
            name: name.to_string(),
            domain: domain.to_string(),
            status: status.to_string(),
        })
        .collect()
}

/// Keeps only encodings with a usable vertical resolution.
fn into_metadata(raw: RawVideoInfo) -> VideoMetadata {
    let formats = raw
        .formats
        .into_iter()
        .filter_map(|format| {
            let quality = format.height.filter(|height| *height > 0)?;
            Some(EncodingOption {
                format_id: format.format_id,
                ext: format.ext,
                quality,
            })
        })
        .collect();

    VideoMetadata {
        title: raw.title,
        uploader: raw.uploader,
        duration: raw.duration,
        view_count: raw.view_count,
        thumbnail: raw.thumbnail,
        formats,
    }
}

async fn verify_output(destination: &Path) -> Result<(), ExtractorError> {
    match tokio::fs::metadata(destination).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(ExtractorError::Failed {
            status: None,
            message: format!(
                "Extractor reported success but '{}' was not written",
                destination.display()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extractor::RawFormat;
    use rocket::http::Status;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeExtractor {
        info: RawVideoInfo,
        fail_with: Option<String>,
        write_partial: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    #[rocket::async_trait]
    impl MetadataFetcher for FakeExtractor {
        async fn fetch_metadata(&self, _url: &str) -> Result<RawVideoInfo, ExtractorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.fail_with {
                Some(message) => Err(ExtractorError::Failed {
                    status: Some(1),
                    message: message.clone(),
                }),
                None => Ok(self.info.clone()),
            }
        }
    }

    #[rocket::async_trait]
    impl Downloader for FakeExtractor {
        async fn download(
            &self,
            url: &str,
            _format_id: &str,
            destination: &Path,
            progress: ProgressFn,
        ) -> Result<(), ExtractorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.write_partial {
                let mut partial = destination.as_os_str().to_owned();
                partial.push(".part");
                tokio::fs::write(PathBuf::from(partial), b"half").await?;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = &self.fail_with {
                return Err(ExtractorError::Failed {
                    status: Some(1),
                    message: message.clone(),
                });
            }
            progress(50.0);
            tokio::fs::write(destination, format!("media of {url}")).await?;
            Ok(())
        }
    }

    fn service_with(extractor: FakeExtractor) -> (VideoService, Arc<FakeExtractor>, TempDir) {
        let dir = TempDir::new().unwrap();
        let extractor = Arc::new(extractor);
        let service = VideoService::new(
            extractor.clone(),
            extractor.clone(),
            VideoServiceConfig {
                download_dir: dir.path().to_path_buf(),
                metadata_timeout: Duration::from_secs(5),
                download_timeout: Duration::from_secs(5),
                max_concurrent_downloads: 2,
                job_retention: Duration::from_secs(3600),
            },
        );
        (service, extractor, dir)
    }

    fn service_with_limits(
        extractor: FakeExtractor,
        download_timeout: Duration,
        max_concurrent_downloads: usize,
    ) -> (VideoService, TempDir) {
        let dir = TempDir::new().unwrap();
        let extractor = Arc::new(extractor);
        let service = VideoService::new(
            extractor.clone(),
            extractor,
            VideoServiceConfig {
                download_dir: dir.path().to_path_buf(),
                metadata_timeout: Duration::from_secs(5),
                download_timeout,
                max_concurrent_downloads,
                job_retention: Duration::from_secs(3600),
            },
        );
        (service, dir)
    }

    fn files_in(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn missing_url_never_reaches_the_adapter() {
        let (service, extractor, _dir) = service_with(FakeExtractor::default());

        assert!(matches!(
            service.get_metadata(None).await,
            Err(VideoError::Validation(_))
        ));
        assert!(matches!(
            service.get_metadata(Some("")).await,
            Err(VideoError::Validation(_))
        ));
        assert!(matches!(
            service.start_download(None, Some("137")).await,
            Err(VideoError::Validation(_))
        ));
        assert!(matches!(
            service.submit_job(Some("  "), None),
            Err(VideoError::Validation(_))
        ));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.jobs().get_size(), 0);
    }

    #[tokio::test]
    async fn metadata_keeps_only_formats_with_quality() {
        let (service, _, _dir) = service_with(FakeExtractor {
            info: RawVideoInfo {
                title: Some("Clip".into()),
                uploader: Some("Uploader".into()),
                duration: Some(61.0),
                view_count: Some(10),
                thumbnail: None,
                formats: vec![
                    RawFormat {
                        format_id: "140".into(),
                        ext: Some("m4a".into()),
                        height: None,
                    },
                    RawFormat {
                        format_id: "18".into(),
                        ext: Some("mp4".into()),
                        height: Some(360),
                    },
                    RawFormat {
                        format_id: "weird".into(),
                        ext: None,
                        height: Some(0),
                    },
                ],
            },
            ..Default::default()
        });

        let metadata = service
            .get_metadata(Some("https://example.com/v1"))
            .await
            .unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Clip"));
        assert_eq!(
            metadata.formats,
            vec![EncodingOption {
                format_id: "18".into(),
                ext: Some("mp4".into()),
                quality: 360,
            }]
        );
    }

    #[tokio::test]
    async fn metadata_failures_are_extraction_errors() {
        let (service, _, _dir) = service_with(FakeExtractor {
            fail_with: Some("ERROR: Video unavailable".into()),
            ..Default::default()
        });

        match service.get_metadata(Some("https://example.com/v1")).await {
            Err(VideoError::Extraction(e)) => assert_eq!(e.to_string(), "ERROR: Video unavailable"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_metadata_lookups_time_out() {
        let dir = TempDir::new().unwrap();
        let extractor = Arc::new(FakeExtractor {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let service = VideoService::new(
            extractor.clone(),
            extractor,
            VideoServiceConfig {
                download_dir: dir.path().to_path_buf(),
                metadata_timeout: Duration::from_millis(20),
                download_timeout: Duration::from_secs(5),
                max_concurrent_downloads: 1,
                job_retention: Duration::from_secs(60),
            },
        );

        assert!(matches!(
            service.get_metadata(Some("https://example.com/v1")).await,
            Err(VideoError::Extraction(ExtractorError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn download_writes_file_and_completes_job() {
        let (service, _, dir) = service_with(FakeExtractor::default());

        let response = service
            .start_download(Some("https://example.com/v1"), None)
            .await
            .unwrap();
        assert!(response.filename.ends_with(".mp4"));
        assert_eq!(
            response.download_url,
            format!("/api/video/stream/{}", response.filename)
        );

        let path = service.resolve_stream(&response.filename).await.unwrap();
        assert_eq!(path, dir.path().join(&response.filename));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "media of https://example.com/v1"
        );

        let job = service.list_jobs().pop().unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.format_id, "best");
        assert_eq!(job.progress, Some(100.0));
    }

    #[tokio::test]
    async fn concurrent_downloads_get_unique_filenames() {
        let (service, _, _dir) = service_with(FakeExtractor::default());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .start_download(Some("https://example.com/same"), Some("best"))
                    .await
                    .unwrap()
                    .filename
            }));
        }

        let mut names = HashSet::new();
        for handle in handles {
            assert!(names.insert(handle.await.unwrap()));
        }
        assert_eq!(names.len(), 8);
    }

    #[tokio::test]
    async fn failed_download_cleans_partial_files() {
        let (service, _, dir) = service_with(FakeExtractor {
            fail_with: Some("ERROR: Requested format is not available".into()),
            write_partial: true,
            ..Default::default()
        });

        let err = service
            .start_download(Some("https://example.com/v1"), Some("999"))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::Download(_)));
        assert_eq!(err.to_string(), "ERROR: Requested format is not available");
        assert!(files_in(dir.path()).is_empty());

        let job = service.list_jobs().pop().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.file_path.is_none());
    }

    #[tokio::test]
    async fn slow_download_times_out_and_leaves_no_files() {
        let (service, dir) = service_with_limits(
            FakeExtractor {
                write_partial: true,
                delay: Some(Duration::from_millis(500)),
                ..Default::default()
            },
            Duration::from_millis(50),
            2,
        );

        let err = service
            .start_download(Some("https://example.com/slow"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VideoError::Download(ExtractorError::Timeout(_))
        ));
        assert_eq!(err.status(), Status::GatewayTimeout);
        assert_eq!(err.to_string(), "Extractor timed out after 50ms");
        assert!(files_in(dir.path()).is_empty());

        let job = service.list_jobs().pop().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("Extractor timed out after 50ms"));
    }

    #[tokio::test]
    async fn waiting_for_a_slot_counts_against_the_download_timeout() {
        let (service, dir) =
            service_with_limits(FakeExtractor::default(), Duration::from_millis(50), 1);
        let _busy = service.permits.acquire().await.unwrap();

        let err = service
            .start_download(Some("https://example.com/queued"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VideoError::Download(ExtractorError::Timeout(_))
        ));

        let job = service.list_jobs().pop().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.progress.is_none());
        assert!(files_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn jobs_beyond_the_permit_limit_stay_pending() {
        let (service, _dir) = service_with_limits(
            FakeExtractor {
                delay: Some(Duration::from_millis(300)),
                ..Default::default()
            },
            Duration::from_secs(5),
            2,
        );

        for n in 1..=3 {
            service
                .submit_job(Some(&format!("https://example.com/v{n}")), None)
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        let statuses: Vec<JobStatus> =
            service.list_jobs().iter().map(|job| job.status).collect();
        let count = |status: JobStatus| statuses.iter().filter(|s| **s == status).count();
        assert_eq!(count(JobStatus::Downloading), 2, "{statuses:?}");
        assert_eq!(count(JobStatus::Pending), 1, "{statuses:?}");

        // The queued job is never timed out while it waits.
        let mut updates = service.jobs().subscribe();
        while service.list_jobs().iter().any(|job| !job.status.is_terminal()) {
            let _ = tokio::time::timeout(Duration::from_secs(1), updates.recv()).await;
        }
        assert!(service
            .list_jobs()
            .iter()
            .all(|job| job.status == JobStatus::Complete));
    }

    #[tokio::test]
    async fn stream_rejects_unknown_and_foreign_names() {
        let (service, _, dir) = service_with(FakeExtractor::default());
        std::fs::write(dir.path().join("notes.txt"), "secret").unwrap();
        let stray = format!("{}.mp4", Uuid::new_v4());
        std::fs::write(dir.path().join(&stray), "stray").unwrap();

        for name in ["notes.txt", "../notes.txt", stray.as_str()] {
            assert!(
                matches!(
                    service.resolve_stream(name).await,
                    Err(VideoError::NotFound(_))
                ),
                "{name}"
            );
        }
    }

    #[tokio::test]
    async fn submitted_jobs_run_in_background_and_dedupe() {
        let (service, extractor, _dir) = service_with(FakeExtractor {
            delay: Some(Duration::from_millis(100)),
            ..Default::default()
        });

        let first = service
            .submit_job(Some("https://example.com/v1"), None)
            .unwrap();
        let second = service
            .submit_job(Some("https://example.com/v1"), Some("best"))
            .unwrap();
        assert_eq!(first.id, second.id);

        let mut updates = service.jobs().subscribe();
        let finished = loop {
            let job = service.job(&first.id.to_string()).unwrap();
            if job.status.is_terminal() {
                break job;
            }
            let _ = tokio::time::timeout(Duration::from_secs(1), updates.recv()).await;
        };
        assert_eq!(finished.status, JobStatus::Complete);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_job_ids_are_not_found() {
        let (service, _, _dir) = service_with(FakeExtractor::default());
        assert!(matches!(service.job("nope"), Err(VideoError::NotFound(_))));
        assert!(matches!(
            service.job(&Uuid::new_v4().to_string()),
            Err(VideoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn garbage_collection_removes_expired_jobs_and_orphans() {
        let dir = TempDir::new().unwrap();
        let extractor = Arc::new(FakeExtractor::default());
        let service = VideoService::new(
            extractor.clone(),
            extractor,
            VideoServiceConfig {
                download_dir: dir.path().to_path_buf(),
                metadata_timeout: Duration::from_secs(5),
                download_timeout: Duration::from_secs(5),
                max_concurrent_downloads: 1,
                job_retention: Duration::ZERO,
            },
        );

        let response = service
            .start_download(Some("https://example.com/v1"), None)
            .await
            .unwrap();
        let orphan = format!("{}.mp4.part", Uuid::new_v4());
        std::fs::write(dir.path().join(&orphan), "leftover").unwrap();
        std::fs::write(dir.path().join("keep.txt"), "unrelated").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = service.collect_garbage().await;
        assert_eq!(report.jobs_removed, 1);
        assert_eq!(report.files_removed, 2);
        assert_eq!(files_in(dir.path()), vec!["keep.txt".to_string()]);
        assert!(matches!(
            service.resolve_stream(&response.filename).await,
            Err(VideoError::NotFound(_))
        ));
    }

    #[test]
    fn supported_sites_are_listed() {
        let sites = supported_sites();
        assert!(sites.iter().any(|site| site.domain == "vimeo.com"));
        assert!(sites
            .iter()
            .any(|site| site.status.starts_with("Limited")));
    }
}
