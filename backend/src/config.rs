use crate::services::{VideoService, VideoServiceConfig, YtDlp};
use anyhow::{Context, Result};
use env_logger::Env;
use log::info;
use rocket::figment::Figment;
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub bind_address: IpAddr,
    pub download_dir: PathBuf,
    pub static_dir: PathBuf,
    pub ytdlp_binary: String,
    pub metadata_timeout: Duration,
    pub download_timeout: Duration,
    pub max_concurrent_downloads: usize,
    pub job_retention: Duration,
    pub cleanup_schedule: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Settings {
            port: parse_or(&lookup, "PORT", 8080)?,
            bind_address: parse_or(&lookup, "BIND_ADDRESS", IpAddr::from([0, 0, 0, 0]))?,
            download_dir: PathBuf::from(string_or("DOWNLOAD_DIR", "downloads")),
            static_dir: PathBuf::from(string_or("STATIC_DIR", "frontend/dist")),
            ytdlp_binary: string_or("YTDLP_BINARY", "yt-dlp"),
            metadata_timeout: Duration::from_secs(parse_or(&lookup, "METADATA_TIMEOUT_SECS", 60)?),
            download_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DOWNLOAD_TIMEOUT_SECS",
                1800,
            )?),
            max_concurrent_downloads: parse_or(&lookup, "MAX_CONCURRENT_DOWNLOADS", 4)?,
            job_retention: Duration::from_secs(parse_or(&lookup, "JOB_RETENTION_SECS", 86400)?),
            cleanup_schedule: string_or("CLEANUP_SCHEDULE", "0 */15 * * * *"),
            cors_allowed_origins: string_or("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }

    pub fn video_service_config(&self) -> VideoServiceConfig {
        VideoServiceConfig {
            download_dir: self.download_dir.clone(),
            metadata_timeout: self.metadata_timeout,
            download_timeout: self.download_timeout,
            max_concurrent_downloads: self.max_concurrent_downloads,
            job_retention: self.job_retention,
        }
    }

    /// Rocket's default figment with the listen address taken from here.
    pub fn figment(&self) -> Figment {
        rocket::Config::figment()
            .merge(("port", self.port))
            .merge(("address", self.bind_address))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value
            .parse()
            .with_context(|| format!("Invalid value '{value}' for {key}")),
        _ => Ok(default),
    }
}

pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting VideoGrab backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

/// Builds the service on top of the `yt-dlp` executable, creates the
/// download directory and sweeps whatever a previous run left behind.
pub async fn create_video_service(settings: &Settings) -> Result<VideoService> {
    info!("Using extractor binary: {}", settings.ytdlp_binary);
    let extractor = Arc::new(YtDlp::new(settings.ytdlp_binary.clone()));
    let service = VideoService::new(
        extractor.clone(),
        extractor,
        settings.video_service_config(),
    );

    service.prepare().await?;
    info!("Downloads go to {}", service.download_dir().display());

    let report = service.collect_garbage().await;
    info!("Startup cleanup removed {} files", report.files_removed);

    Ok(service)
}

pub async fn setup_cleanup_scheduler(
    video_service: VideoService,
    schedule: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let cleanup_job = Job::new_async(schedule, move |_uuid, _l| {
        let service = video_service.clone();
        Box::pin(async move {
            service.collect_garbage().await;
        })
    })
    .with_context(|| format!("Invalid cleanup schedule '{schedule}'"))?;

    scheduler.add(cleanup_job).await?;
    scheduler.start().await?;
    info!("Cleanup scheduler started ({schedule}).");

    Ok(scheduler)
}

pub fn create_cors(settings: &Settings) -> Result<rocket_cors::Cors> {
    let allowed_origins = if settings.cors_allowed_origins.iter().any(|o| o == "*") {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(settings.cors_allowed_origins.as_slice())
    };

    let cors = CorsOptions::default()
        .allowed_origins(allowed_origins)
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .allow_credentials(false)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
