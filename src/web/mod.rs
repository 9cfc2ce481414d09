pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{
    models::{InferenceEngine, ModelManager, OrtEngine},
    utils::error::ServiceError,
    Config, Result,
};
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer,
};

pub const SERVICE_NAME: &str = "Brain Tumor Detection API";

/// 请求处理共享状态，启动时构建一次
pub struct AppState<E: InferenceEngine> {
    pub models: ModelManager<E>,
    /// 首页文件（启动时存在才设置）
    pub index_path: Option<PathBuf>,
}

impl<E: InferenceEngine> AppState<E> {
    pub fn new(models: ModelManager<E>, config: &Config) -> Self {
        let index_path = config.index_path();
        let index_path = if index_path.is_file() {
            tracing::info!("Serving UI from {}", index_path.display());
            Some(index_path)
        } else {
            tracing::warn!(
                "Static index not found at {}, root will return JSON descriptor",
                index_path.display()
            );
            None
        };

        Self { models, index_path }
    }
}

pub async fn serve(config: Config) -> Result<()> {
    // 初始化模型（仅一次）
    let engine = OrtEngine::new(&config.onnx_config);
    let models = ModelManager::init(
        engine,
        &config.candidate_paths(),
        config.primary_model_file(),
    );
    let state = Arc::new(AppState::new(models, &config));

    let app = create_app(state, &config);

    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        ServiceError::Config(format!("Invalid bind address {}: {}", config.bind_addr, e))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    if config.dev_mode {
        tracing::info!(
            "Development mode enabled: request timeout {}s",
            config.server_config.request_timeout
        );
    }
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /         - Web UI or service descriptor");
    tracing::info!("  GET  /health   - Health check");
    tracing::info!("  GET  /docs     - API description");
    tracing::info!("  POST /predict  - Multipart image upload (field 'file')");

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        ServiceError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServiceError::Internal(format!("Server failed to start: {}", e)))?;

    Ok(())
}

pub fn create_app<E: InferenceEngine>(state: Arc<AppState<E>>, config: &Config) -> Router {
    let mut app = Router::new()
        .route("/", get(ui::index_handler::<E>))
        .route("/health", get(health_handler))
        .route("/docs", get(docs_handler::<E>))
        .route("/predict", post(handlers::predict_handler::<E>))
        .with_state(state);

    if config.static_dir.is_dir() {
        app = app.nest_service("/static", ServeDir::new(&config.static_dir));
    }

    app.layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server_config.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server_config.request_timeout,
        )))
        .layer(CorsLayer::permissive())
}

/// 健康检查端点，不检查模型状态
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "API is running" }))
}

/// API说明端点
async fn docs_handler<E: InferenceEngine>(
    State(state): State<Arc<AppState<E>>>,
) -> Json<serde_json::Value> {
    let stats = state.models.get_stats();

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "model": stats,
        "classes": crate::prediction::ClassLabel::ALL,
        "endpoints": [
            { "method": "GET", "path": "/", "description": "Web UI or service descriptor" },
            { "method": "GET", "path": "/health", "description": "Health check" },
            { "method": "GET", "path": "/docs", "description": "API description" },
            { "method": "POST", "path": "/predict", "description": "Classify an uploaded MRI image (multipart field 'file')" }
        ]
    }))
}
