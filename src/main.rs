use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront_api::adapters::ai::StubQuestionAnswerer;
use storefront_api::adapters::http::{build_router, AdminAccess, AppState};
use storefront_api::adapters::postgres::{PostgresCatalogRepository, PostgresOrderRepository};
use storefront_api::adapters::stripe::{StripeConfig, StripeGateway};
use storefront_api::application::handlers::CheckoutRedirects;
use storefront_api::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let gateway = StripeGateway::new(StripeConfig::from_payment_config(&config.payment))?;
    if config.payment.is_test_mode() {
        info!("Stripe running in test mode");
    }

    let state = AppState {
        catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool)),
        payment_gateway: Arc::new(gateway),
        answerer: Arc::new(StubQuestionAnswerer::new()),
        redirects: CheckoutRedirects::from(&config.payment),
        admin: AdminAccess::new(&config.admin, config.server.environment),
    };

    let app = build_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Storefront API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level when set.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if server.is_production() {
        builder.json().with_target(false).try_init()
    } else {
        builder.try_init()
    };
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
    info!("Shutdown signal received");
}
