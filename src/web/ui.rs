use crate::{models::InferenceEngine, web::AppState, web::SERVICE_NAME};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

/// 首页处理器：存在静态首页时返回HTML，否则返回服务描述
pub async fn index_handler<E: InferenceEngine>(
    State(state): State<Arc<AppState<E>>>,
) -> Response {
    if let Some(path) = &state.index_path {
        match tokio::fs::read(path).await {
            Ok(html) => return Html(html).into_response(),
            Err(e) => tracing::warn!("Failed to read {}: {}", path.display(), e),
        }
    }

    Json(json!({
        "message": SERVICE_NAME,
        "docs": "/docs",
        "health": "/health"
    }))
    .into_response()
}
