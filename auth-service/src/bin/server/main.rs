use std::sync::Arc;

use auth_service::config::Config;
use auth_service::domain::credentials::ports::AuthServicePort;
use auth_service::domain::credentials::service::AuthService;
use auth_service::domain::credentials::tokens::TokenCodec;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::RouterOptions;
use auth_service::inbound::http::server::serve;
use auth_service::inbound::maintenance::spawn_maintenance;
use auth_service::outbound::repositories::postgres::PostgresUserStore;
use auth_service::outbound::revocation::InMemoryRevocationIndex;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.port,
        read_timeout_secs = config.server.read_timeout.as_secs(),
        write_timeout_secs = config.server.write_timeout.as_secs(),
        idle_timeout_secs = config.server.idle_timeout.as_secs(),
        database_host = %config.database.host,
        database_name = %config.database.name,
        access_ttl_secs = config.jwt.access_ttl.num_seconds(),
        refresh_ttl_secs = config.jwt.refresh_ttl.num_seconds(),
        cors_origins = ?config.cors.allowed_origins,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.connect_options())
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = auth::PasswordHasher::with_work_factor(config.password)?;
    let token_codec = TokenCodec::new(
        config.jwt.secret.as_bytes(),
        config.jwt.access_ttl,
        config.jwt.refresh_ttl,
    );
    let user_store = Arc::new(PostgresUserStore::new(pg_pool));
    let revocation_index = Arc::new(InMemoryRevocationIndex::new());

    let auth_service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(
        user_store,
        revocation_index,
        token_codec,
        password_hasher,
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let maintenance = spawn_maintenance(
        Arc::clone(&auth_service),
        config.maintenance.interval,
        shutdown_rx,
    );

    let http_address = format!("0.0.0.0:{}", config.server.port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        Arc::clone(&auth_service),
        RouterOptions {
            body_timeout: config.server.read_timeout,
            request_timeout: config.server.write_timeout,
            allowed_origins: config.cors.allowed_origins.clone(),
        },
    );

    serve(
        http_listener,
        http_application,
        config.server.idle_timeout,
        shutdown_signal(),
    )
    .await;
    tracing::info!("Http server drained");

    if shutdown_tx.send(true).is_err() {
        tracing::warn!("Maintenance task already stopped");
    }
    if let Err(e) = maintenance.await {
        tracing::error!(error = %e, "Maintenance task failed");
    }

    tracing::info!("Service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
