use chrono::{Datelike, Duration, Local};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable::api::router;
use timetable::config::AppConfig;
use timetable::db;
use timetable::models::Day;
use timetable::services::load_demo_data;
use timetable::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.database_url, config.max_connections).await?;

    if config.seed_demo_data {
        let today = Local::now().date_naive();
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let report = load_demo_data(&pool, Day::from(monday)).await?;
        info!(
            "seeded {} block(s), {} rejected by the validator",
            report.blocks_inserted, report.blocks_rejected
        );
    }

    let state = AppState::new(pool, config.notify_capacity);
    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
