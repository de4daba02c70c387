use crate::error::VideoError;
use crate::models::BEST_FORMAT;
use url::Url;
use uuid::Uuid;

/// Checks that a client supplied a usable http(s) URL and returns it trimmed.
pub fn validate_source_url(url: Option<&str>) -> Result<String, VideoError> {
    let url = url.map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(VideoError::Validation("URL is required".to_string()));
    }

    let parsed =
        Url::parse(url).map_err(|e| VideoError::Validation(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(url.to_string()),
        "http" | "https" => Err(VideoError::Validation("URL has no host".to_string())),
        other => Err(VideoError::Validation(format!(
            "Unsupported URL scheme '{other}'"
        ))),
    }
}

pub fn normalize_format(format_id: Option<&str>) -> String {
    match format_id.map(str::trim) {
        Some(format_id) if !format_id.is_empty() => format_id.to_string(),
        _ => BEST_FORMAT.to_string(),
    }
}

/// Recovers the job id from a generated `<uuid>.<ext>` filename. Anything
/// else, including names carrying path separators, yields `None`.
pub fn parse_generated_filename(filename: &str) -> Option<Uuid> {
    if filename.contains(['/', '\\']) {
        return None;
    }

    let (stem, ext) = filename.split_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let id = Uuid::parse_str(stem).ok()?;
    // Only the hyphenated form is ever generated.
    (id.hyphenated().to_string() == stem).then_some(id)
}

/// Job id of any file written for a job: the final output, `.part`
/// leftovers or intermediate format files all start with it.
pub fn job_id_prefix(filename: &str) -> Option<Uuid> {
    let stem = filename.get(..36)?;
    Uuid::parse_str(stem).ok()
}
