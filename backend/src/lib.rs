#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use rocket::fs::{FileServer, Options};
use rocket::{Build, Rocket};
use services::VideoService;
use std::path::PathBuf;

pub struct AppState {
    pub video_service: VideoService,
    pub static_dir: PathBuf,
}

/// Mounts the API, the frontend assets and the JSON catchers on `rocket`.
pub fn build_rocket(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    let assets = FileServer::new(&state.static_dir, Options::Index | Options::Missing).rank(10);

    rocket
        .manage(state)
        .mount(
            "/api/video",
            routes![
                api::video_info,
                api::start_download,
                api::stream_video,
                api::supported_sites,
                api::submit_job,
                api::list_jobs,
                api::get_job,
                api::watch_job,
            ],
        )
        .mount("/", assets)
        .mount("/", routes![api::spa_fallback])
        .register(
            "/",
            catchers![
                api::bad_request,
                api::not_found,
                api::unprocessable_entity,
                api::internal_error,
            ],
        )
}
