use crate::error::VideoError;
use crate::models::{DownloadRequest, JobView};
use crate::AppState;
use rocket::http::Status;
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket::{get, post, Shutdown, State};

#[post("/jobs", data = "<request>")]
pub async fn submit_job(
    state: &State<AppState>,
    request: Json<DownloadRequest>,
) -> Result<(Status, Json<JobView>), VideoError> {
    let job = state
        .video_service
        .submit_job(request.url.as_deref(), request.format_id.as_deref())?;
    Ok((Status::Accepted, Json(JobView::from(&job))))
}

#[get("/jobs")]
pub fn list_jobs(state: &State<AppState>) -> Json<Vec<JobView>> {
    Json(
        state
            .video_service
            .list_jobs()
            .iter()
            .map(JobView::from)
            .collect(),
    )
}

#[get("/jobs/<id>")]
pub fn get_job(state: &State<AppState>, id: &str) -> Result<Json<JobView>, VideoError> {
    let job = state.video_service.job(id)?;
    Ok(Json(JobView::from(&job)))
}

/// Sends the current snapshot, then every update of the job until it
/// reaches a terminal state.
#[get("/jobs/<id>/events")]
pub fn watch_job(
    state: &State<AppState>,
    id: &str,
    mut shutdown: Shutdown,
) -> Result<EventStream![], VideoError> {
    let service = state.video_service.clone();
    // Subscribe first so no update slips in between snapshot and stream.
    let mut updates = service.jobs().subscribe();
    let job = service.job(id)?;

    Ok(EventStream! {
        let job_id = job.id;
        let mut done = job.status.is_terminal();
        yield Event::json(&JobView::from(&job));

        while !done {
            let update = select! {
                msg = updates.recv() => match msg {
                    Ok(update) if update.id == job_id => update,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => match service.jobs().get(&job_id) {
                        Some(current) => current,
                        None => break,
                    },
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            };

            done = update.status.is_terminal();
            yield Event::json(&JobView::from(&update));
        }
    })
}
