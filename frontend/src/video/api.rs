use crate::env_variable_utils::BACKEND_URL;
use crate::models::{
    DownloadRequest, DownloadResponse, ErrorResponse, JobView, SupportedSite,
    SupportedSitesResponse, VideoInfoRequest, VideoMetadata,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

/// A failed backend call, with the hint the backend attaches to bot checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub message: String,
    pub suggestion: Option<String>,
}

impl ApiError {
    fn new(message: String) -> Self {
        ApiError {
            message,
            suggestion: None,
        }
    }
}

fn api_url(path: &str) -> String {
    format!("{}/api/video{path}", &*BACKEND_URL)
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.ok() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::new(format!("Failed to parse response: {e}")));
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(error_response) => Err(ApiError {
            message: error_response.error,
            suggestion: error_response.suggestion,
        }),
        Err(_) => Err(ApiError::new(format!(
            "Request failed ({status}): {text}"
        ))),
    }
}

async fn get<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let response = Request::get(&api_url(path))
        .send()
        .await
        .map_err(|e| ApiError::new(format!("Network error: {e}")))?;
    read_response(response).await
}

async fn post<B: serde::Serialize, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, ApiError> {
    let response = Request::post(&api_url(path))
        .json(body)
        .map_err(|e| ApiError::new(format!("Request error: {e}")))?
        .send()
        .await
        .map_err(|e| ApiError::new(format!("Network error: {e}")))?;
    read_response(response).await
}

pub async fn fetch_video_info(url: &str) -> Result<VideoMetadata, ApiError> {
    post(
        "/info",
        &VideoInfoRequest {
            url: url.to_string(),
        },
    )
    .await
}

pub async fn start_download(url: &str, format_id: &str) -> Result<DownloadResponse, ApiError> {
    post(
        "/download",
        &DownloadRequest {
            url: url.to_string(),
            format_id: format_id.to_string(),
        },
    )
    .await
}

pub async fn submit_job(url: &str, format_id: &str) -> Result<JobView, ApiError> {
    post(
        "/jobs",
        &DownloadRequest {
            url: url.to_string(),
            format_id: format_id.to_string(),
        },
    )
    .await
}

pub async fn get_job(id: &str) -> Result<JobView, ApiError> {
    get(&format!("/jobs/{id}")).await
}

pub async fn list_jobs() -> Result<Vec<JobView>, ApiError> {
    get("/jobs").await
}

pub async fn supported_sites() -> Result<Vec<SupportedSite>, ApiError> {
    get::<SupportedSitesResponse>("/supported-sites")
        .await
        .map(|response| response.supported_sites)
}
