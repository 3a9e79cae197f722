//! Fleamarket Server - Main entry point

use anyhow::Result;
use fleamarket_common::logging::{init_logging, LogConfig};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

use fleamarket_server::{
    config::{Config, Environment},
    features::FeatureState,
    import::{CustomerStore, ImportPipeline, MemoryCustomerStore, PgCustomerStore},
    server::{create_router, shutdown_signal, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::default()
        .with_file_prefix("fleamarket-server")
        .with_directives("fleamarket_server=debug,tower_http=debug,sqlx=warn")
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Fleamarket Server");

    let config = Config::load()?;
    info!(
        environment = ?config.environment,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let store = connect_store(&config).await?;
    let pipeline = Arc::new(ImportPipeline::new(store, config.import.pool_size()?));
    info!(
        store = pipeline.store().backend(),
        pool_size = pipeline.pool_size(),
        import_file = %config.import.file_path.display(),
        "Import pipeline ready"
    );

    let shutdown = CancellationToken::new();
    let state = AppState {
        features: FeatureState {
            pipeline,
            import_file: config.import.file_path.clone(),
            shutdown: shutdown.clone(),
        },
    };

    let app = create_router(state, &config);

    let addr = config.server.bind_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown, config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Select the customer store for the configured environment
async fn connect_store(config: &Config) -> Result<Arc<dyn CustomerStore>> {
    match config.environment {
        Environment::Prod => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
                .connect(&config.database.url)
                .await?;
            info!("Database connection pool established");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            info!("Database migrations completed");

            Ok(Arc::new(PgCustomerStore::new(pool)))
        },
        Environment::Dev => {
            info!("Using in-memory customer store");
            Ok(Arc::new(MemoryCustomerStore::new()))
        },
    }
}
