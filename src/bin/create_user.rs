//! Provisions a user and prints its API token.
//!
//! Usage: `create_user <username>`

use std::env;

use taskboard::config::AppConfig;
use taskboard::db;
use taskboard::logging::init_tracing;
use taskboard::services::UserService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let Some(username) = env::args().nth(1) else {
        eprintln!("usage: create_user <username>");
        std::process::exit(2);
    };

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let user = UserService::new(pool).create_user(&username).await?;

    println!("Created user {} ({})", user.username, user.id);
    println!("API token: {}", user.api_token);

    Ok(())
}
