use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EncodingOption {
    pub format_id: String,
    pub ext: Option<String>,
    pub quality: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub formats: Vec<EncodingOption>,
}

#[derive(Debug, Serialize)]
pub struct VideoInfoRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DownloadResponse {
    pub filename: String,
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
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

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Downloading => "Downloading",
            JobStatus::Complete => "Complete",
            JobStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct JobView {
    pub id: String,
    pub url: String,
    pub format_id: String,
    pub status: JobStatus,
    pub filename: String,
    pub progress: Option<f32>,
    pub error: Option<String>,
    pub download_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub finished_at: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SupportedSite {
    pub name: String,
    pub domain: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SupportedSitesResponse {
    pub supported_sites: Vec<SupportedSite>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub suggestion: Option<String>,
}
