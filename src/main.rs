use axum::{
    routing::{get, post},
    Router,
};
use siat_sales_validator::{api, create_pool, AppConfig, ValidationService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // Inventory database (system of record)
    let pool = create_pool(&config.inventory.url).await?;
    info!("Inventory database pool created");

    // SAS ledger database, optional
    let ledger_pool = match &config.ledger.url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("Ledger database pool created");
            Some(pool)
        }
        None => {
            info!("No ledger database configured, sync endpoint disabled");
            None
        }
    };

    let service = Arc::new(ValidationService::new(pool, ledger_pool, config.clone()));

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/validate", post(api::validate))
        .route("/api/sync", post(api::sync))
        .with_state(service)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/validate - reconcile SIAT export against inventory");
    info!("  POST /api/sync     - reconcile, then upsert into the SAS ledger");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
