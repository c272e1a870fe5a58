use dotenvy::dotenv;
use homebase::api::{self, AppState};
use homebase::config::{self, database};
use homebase::core::{grocery, token::TokenIssuer};
use homebase::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env first so RUST_LOG and friends can come from it
    let dotenv_loaded = dotenv().is_ok();

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!(dotenv_loaded, "Starting homebase");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!(
        bind_addr = %app_config.settings.server.bind_addr,
        remember_me_days = app_config.settings.auth.remember_me_days,
        "Configuration loaded"
    );

    // 4. Connect and create tables
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed the fixed grocery categories
    grocery::seed_default_categories(&db)
        .await
        .inspect_err(|e| error!("Failed to seed grocery categories: {}", e))?;

    // 6. Serve
    let state = AppState::new(
        db,
        TokenIssuer::new(app_config.token),
        app_config.settings.auth.bcrypt_cost,
    );
    let listener = tokio::net::TcpListener::bind(app_config.settings.server.bind_addr.as_str())
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.settings.server.bind_addr, e))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
