use crate::api::media::{MediaFile, RangeHeader};
use crate::error::VideoError;
use crate::models::{
    DownloadRequest, DownloadResponse, SupportedSitesResponse, VideoInfoRequest, VideoMetadata,
};
use crate::services::video_service;
use crate::AppState;
use log::info;
use rocket::serde::json::Json;
use rocket::{get, post, State};

#[post("/info", data = "<request>")]
pub async fn video_info(
    state: &State<AppState>,
    request: Json<VideoInfoRequest>,
) -> Result<Json<VideoMetadata>, VideoError> {
    let metadata = state
        .video_service
        .get_metadata(request.url.as_deref())
        .await?;
    info!(
        "Found {} formats for {}",
        metadata.formats.len(),
        request.url.as_deref().unwrap_or_default()
    );
    Ok(Json(metadata))
}

#[post("/download", data = "<request>")]
pub async fn start_download(
    state: &State<AppState>,
    request: Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, VideoError> {
    let response = state
        .video_service
        .start_download(request.url.as_deref(), request.format_id.as_deref())
        .await?;
    Ok(Json(response))
}

/// Plays inline: no attachment disposition, content type from the extension.
/// Byte ranges are honoured so players can seek.
#[get("/stream/<filename>")]
pub async fn stream_video(
    state: &State<AppState>,
    filename: &str,
    range: RangeHeader,
) -> Result<MediaFile, VideoError> {
    let path = state.video_service.resolve_stream(filename).await?;
    MediaFile::open(&path, range.0.as_deref())
        .await
        .map_err(|_| VideoError::NotFound("File not found".to_string()))
}

#[get("/supported-sites")]
pub fn supported_sites() -> Json<SupportedSitesResponse> {
    Json(SupportedSitesResponse {
        supported_sites: video_service::supported_sites(),
    })
}
