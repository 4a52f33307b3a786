use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lexscan_analysis::ContractAnalyzer;
use lexscan_core::AppConfig;
use lexscan_generation::BedrockGenerationClient;
use lexscan_ocr::TextractOcrService;
use lexscan_server::{create_router, AppState};
use lexscan_storage::S3ObjectStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lexscan=info".parse().unwrap()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };
    let host = config.server_host.clone();
    let port = config.server_port;

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    let analyzer = Arc::new(ContractAnalyzer::new(
        Arc::new(S3ObjectStore::new(&sdk_config)),
        Arc::new(TextractOcrService::new(&sdk_config)),
        Arc::new(BedrockGenerationClient::new(&sdk_config, config.model_id.clone())),
        config.poller,
        config.bucket.clone(),
        config.upload_prefix.clone(),
    ));

    let state = AppState::new(config, analyzer);

    let app = create_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    tracing::info!("lexscan server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
