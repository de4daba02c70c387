use crate::models::ErrorResponse;
use crate::AppState;
use rocket::fs::NamedFile;
use rocket::http::Status;
use rocket::{catch, get, Request, State};
use std::path::PathBuf;

/// Client-side routes of the single-page app resolve to `index.html`.
/// Unknown API paths stay 404.
#[get("/<path..>", rank = 20)]
pub async fn spa_fallback(path: PathBuf, state: &State<AppState>) -> Result<NamedFile, ErrorResponse> {
    if path.starts_with("api") {
        return Err(ErrorResponse::new(Status::NotFound, "Not found"));
    }

    NamedFile::open(state.static_dir.join("index.html"))
        .await
        .map_err(|_| ErrorResponse::new(Status::NotFound, "Not found"))
}

#[catch(400)]
pub fn bad_request(_: &Request) -> ErrorResponse {
    ErrorResponse::new(Status::BadRequest, "Bad request")
}

#[catch(404)]
pub fn not_found(req: &Request) -> ErrorResponse {
    ErrorResponse::new(Status::NotFound, format!("No route for {}", req.uri()))
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> ErrorResponse {
    ErrorResponse::new(Status::UnprocessableEntity, "Malformed request body")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> ErrorResponse {
    ErrorResponse::new(Status::InternalServerError, "Internal server error")
}
