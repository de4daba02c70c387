use crate::models::ErrorResponse;
use log::{error, warn};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use std::time::Duration;
use thiserror::Error;

/// Phrases the extractor prints when a platform demands proof that the
/// caller is human.
const BOT_CHECK_MARKERS: &[&str] = &[
    "confirm you're not a bot",
    "confirm you are not a bot",
    "http error 429",
    "too many requests",
];

const BOT_CHECK_SUGGESTION: &str = "The platform is rate limiting automated requests. \
Wait a few minutes and try again, or try a video from another site.";

/// Failure reported by the extraction adapter.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Failed to launch extractor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Failed { status: Option<i32>, message: String },

    #[error("Failed to parse extractor output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Extractor I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extractor timed out after {0:?}")]
    Timeout(Duration),
}

impl ExtractorError {
    pub fn is_bot_check(&self) -> bool {
        match self {
            ExtractorError::Failed { message, .. } => {
                let message = message.to_lowercase();
                BOT_CHECK_MARKERS
                    .iter()
                    .any(|marker| message.contains(marker))
            }
            _ => false,
        }
    }

    fn status(&self) -> Status {
        match self {
            ExtractorError::Timeout(_) => Status::GatewayTimeout,
            _ if self.is_bot_check() => Status::TooManyRequests,
            _ => Status::InternalServerError,
        }
    }
}

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Extraction(#[source] ExtractorError),

    #[error("{0}")]
    Download(#[source] ExtractorError),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VideoError {
    pub fn status(&self) -> Status {
        match self {
            VideoError::Validation(_) => Status::BadRequest,
            VideoError::NotFound(_) => Status::NotFound,
            VideoError::Extraction(e) | VideoError::Download(e) => e.status(),
            VideoError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            VideoError::Extraction(e) | VideoError::Download(e) if e.is_bot_check() => {
                Some(BOT_CHECK_SUGGESTION.to_string())
            }
            _ => None,
        }
    }
}

impl<'r> Responder<'r, 'static> for VideoError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {} failed: {self}", request.method(), request.uri());
        } else {
            warn!("{} {} rejected: {self}", request.method(), request.uri());
        }

        ErrorResponse::new(status, self.to_string())
            .with_suggestion(self.suggestion())
            .respond_to(request)
    }
}
