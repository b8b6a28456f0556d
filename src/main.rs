use std::sync::Arc;

use clap::Parser;
use passkeeper::{
    api::{start_api_server, ApiState},
    config::ServerFlags,
    observability::{init_observability, log_config_info},
    storage::{check_connection, create_pool, get_pool_stats},
    AppConfig, Result, APP_NAME, VERSION,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "passkeeper")]
#[command(about = "PassKeeper secret storage server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[command(flatten)]
    flags: ServerFlags,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before any configuration is read from the environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let args = Args::parse();
    let config = AppConfig::load(&args.flags)?;

    init_observability(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting PassKeeper server");
    log_config_info(&config);

    let db_kind = if config.database.is_in_memory() { "sqlite (in-memory)" } else { "sqlite" };
    info!(database = db_kind, "Creating database connection pool");
    let pool = create_pool(&config.database).await?;
    check_connection(&pool).await?;
    let stats = get_pool_stats(&pool);
    info!(size = stats.size, idle = stats.idle, "Database ready");

    let state = ApiState::new(pool, Arc::new(config.auth.jwt_settings()));
    start_api_server(config.server.socket_addr()?, state).await?;

    info!("PassKeeper shutdown completed");
    Ok(())
}
