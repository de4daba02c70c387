use videograb_backend::config::{self, Settings};
use videograb_backend::{build_rocket, AppState};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    config::load_environment();
    config::init_logger();

    let settings = Settings::from_env()?;
    let video_service = config::create_video_service(&settings).await?;
    let mut scheduler =
        config::setup_cleanup_scheduler(video_service.clone(), &settings.cleanup_schedule).await?;
    let cors = config::create_cors(&settings)?;

    let state = AppState {
        video_service,
        static_dir: settings.static_dir.clone(),
    };

    build_rocket(rocket::custom(settings.figment()), state)
        .attach(cors)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {e}"))?;

    scheduler.shutdown().await?;
    Ok(())
}
