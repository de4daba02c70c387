use chrono::{DateTime, Utc};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;
use std::path::PathBuf;
use uuid::Uuid;

/// Format selector handed to the extractor when the client does not pick one.
pub const BEST_FORMAT: &str = "best";

/// Container suffix of every generated download.
pub const DOWNLOAD_EXTENSION: &str = "mp4";

pub const STREAM_ROUTE_PREFIX: &str = "/api/video/stream";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VideoInfoRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingOption {
    pub format_id: String,
    pub ext: Option<String>,
    pub quality: u32, // vertical resolution
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>, // in seconds
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub formats: Vec<EncodingOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub filename: String,
    pub download_url: String,
}

impl DownloadResponse {
    pub fn for_filename(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            download_url: stream_url(filename),
        }
    }
}

pub fn stream_url(filename: &str) -> String {
    format!("{STREAM_ROUTE_PREFIX}/{filename}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Downloading,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Downloading => "downloading",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }
}

/// Lifecycle record of one download. Only the job store mutates it, which
/// keeps `file_path` populated exactly when `status` is `Complete`.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub id: Uuid,
    pub url: String,
    pub format_id: String,
    pub filename: String,
    pub status: JobStatus,
    pub file_path: Option<PathBuf>,
    pub error: Option<String>,
    pub progress: Option<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl VideoJob {
    pub fn new(url: String, format_id: String) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            url,
            format_id,
            filename: format!("{id}.{DOWNLOAD_EXTENSION}"),
            status: JobStatus::Pending,
            file_path: None,
            error: None,
            progress: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    pub id: String,
    pub url: String,
    pub format_id: String,
    pub status: JobStatus,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl From<&VideoJob> for JobView {
    fn from(job: &VideoJob) -> Self {
        Self {
            id: job.id.to_string(),
            url: job.url.clone(),
            format_id: job.format_id.clone(),
            status: job.status,
            filename: job.filename.clone(),
            progress: job.progress,
            error: job.error.clone(),
            download_url: (job.status == JobStatus::Complete).then(|| stream_url(&job.filename)),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            finished_at: job.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedSite {
    pub name: String,
    pub domain: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SupportedSitesResponse {
    pub supported_sites: Vec<SupportedSite>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip)]
    pub status: Option<Status>,
}

impl ErrorResponse {
    pub fn new(status: Status, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            status: Some(status),
        }
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status.unwrap_or(Status::BadRequest))
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
