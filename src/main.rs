use tracing::info;

use taskboard::api::router;
use taskboard::config::AppConfig;
use taskboard::db;
use taskboard::logging::init_tracing;
use taskboard::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let state = AppState::new(pool);

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
