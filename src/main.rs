// Main entry point for the account service

use account_service::api::{create_router, AppState};
use account_service::auth::audit_logger::AuditLogger;
use account_service::auth::auth_middleware::AuthState;
use account_service::auth::token::TokenService;
use account_service::config::Config;
use account_service::core::credentials::PasswordHasher;
use account_service::store::seed::seed_accounts;
use account_service::store::{AccountStore, PgAccountStore};

use anyhow::Context;
use clap::Parser;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// Account management REST service
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Create two demo accounts before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Load and validate configuration first (before any logging)
    let config = Config::from_env().context("Configuration error")?;

    // 2. Initialize tracing subscriber with config values
    init_tracing(&config)?;

    info!("Starting account service");
    info!(
        bind_address = %config.bind_address,
        port = config.port,
        token_ttl_secs = config.token_ttl_secs,
        bcrypt_cost = config.bcrypt_cost,
        "Configuration loaded"
    );

    // 3. Connect to PostgreSQL and make sure the table exists
    let store = PgAccountStore::connect(config.connect_options()?, config.db_max_connections)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to database");
            e
        })?;
    store.init().await?;
    info!("Account store initialized");

    let store: Arc<dyn AccountStore> = Arc::new(store);

    // 4. Credential and token services
    let hasher = PasswordHasher::new(config.bcrypt_cost)?;
    let token_service = Arc::new(TokenService::new(
        Secret::new(config.jwt_secret.expose_secret().clone()),
        config.token_ttl(),
    )?);

    // 5. Optional demo data
    if cli.seed {
        let seeded = seed_accounts(store.as_ref(), &hasher).await?;
        info!(count = seeded.len(), "Seeding complete");
    }

    // 6. Create AuthState and AppState
    let auth_state = Arc::new(AuthState {
        store: store.clone(),
        token_service: token_service.clone(),
        audit_logger: Arc::new(AuditLogger::new()),
    });

    let addr = config.listen_addr();
    let app_state = AppState {
        store,
        token_service,
        hasher,
        config: Arc::new(config),
    };

    // 7. Create router
    let router = create_router(&app_state, auth_state).with_state(app_state);

    // 8. Start HTTP server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            error!(error = %e, addr = %addr, "Failed to bind to address");
            e
        })?;

    info!(addr = %addr, "Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins over LOG_LEVEL when set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
    } else {
        subscriber
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
