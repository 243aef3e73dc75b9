use eduresolve::bootstrap;
use eduresolve::config::Config;
use eduresolve::infrastructure::http::build_router;
use eduresolve::infrastructure::observability;
use eduresolve::infrastructure::persistence::Database;

fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Worker threads carry the service name into every log line
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(config.service_name.clone())
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let _guard = observability::init(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    let providers = bootstrap::build_providers(&config)?;
    let state = bootstrap::build_app_state(db, providers);

    let app = build_router(state, config.request_timeout);

    // Start server
    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
