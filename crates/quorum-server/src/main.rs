//! Quorum Invitation Platform - Main Server

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::Settings;
use quorum_api::AppState;
use quorum_db::{create_pool, ensure_schema, DatabaseConfig, PgAccessRecordStore, PgInviteStore};
use quorum_directory::GraphDirectoryClient;
use quorum_invite::{InviteWorkflow, RedirectTokenMinter};
use quorum_mail::SmtpMailer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;

    info!(
        "Starting Quorum Invitation Platform v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Configuration loaded successfully");

    // Initialize services
    let state = initialize_services(&settings).await?;

    // Create API router with state
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quorum=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn initialize_services(settings: &Settings) -> Result<AppState> {
    // Initialize database connection pool
    info!("Connecting to PostgreSQL...");
    let db_config = DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: 2,
        acquire_timeout_secs: 30,
        idle_timeout_secs: 600,
    };

    let db_pool = create_pool(&db_config)
        .await
        .context("Failed to connect to PostgreSQL")?;
    info!("PostgreSQL connection established");

    ensure_schema(&db_pool)
        .await
        .context("Failed to bootstrap database schema")?;
    info!("Database schema ready");

    // Stores
    let invites = Arc::new(PgInviteStore::new(db_pool.clone()));
    let access = Arc::new(PgAccessRecordStore::new(db_pool.clone()));

    // Directory client
    info!(
        "Configuring directory client for tenant {}",
        settings.directory.tenant_domain
    );
    let directory = Arc::new(
        GraphDirectoryClient::new(settings.directory.clone())
            .context("Failed to create directory client")?,
    );

    // Mail transport, built once at startup
    let mailer =
        Arc::new(SmtpMailer::new(&settings.mail).context("Failed to create SMTP transport")?);
    info!("SMTP transport configured for {}", settings.mail.host);

    // Token mint client
    let minter = Arc::new(
        RedirectTokenMinter::new(settings.token_mint.clone())
            .context("Failed to create token mint client")?,
    );

    // Workflow orchestrator
    let workflow = Arc::new(InviteWorkflow::new(
        directory.clone(),
        invites.clone(),
        access.clone(),
        mailer,
        minter,
        settings.invite.ttl_hours,
    ));

    let state = AppState::new(
        db_pool,
        directory,
        invites,
        access,
        workflow,
        settings.invite.welcome_key.clone(),
    );

    info!("All services initialized successfully");
    Ok(state)
}

fn create_app(state: AppState) -> Router {
    let app = quorum_api::create_router(state);

    // Add middleware
    app.layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
