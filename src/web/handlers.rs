use crate::{
    models::InferenceEngine,
    prediction::{PredictionPipeline, PredictionResult},
    utils::error::ServiceError,
    web::AppState,
    Result,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use std::sync::Arc;
use std::time::Instant;

/// Multipart文件上传预测处理器
///
/// 所有错误均以 `{"error": ...}` 形式返回，状态码为200。
pub async fn predict_handler<E: InferenceEngine>(
    State(state): State<Arc<AppState<E>>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>> {
    // 演示模式直接返回，不读取上传内容
    state.models.ensure_loaded()?;

    // 非multipart请求同样以带内错误返回
    let mut multipart = multipart
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid multipart request: {}", e)))?;

    let start_time = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    tracing::info!("Processing prediction request: request_id={}", request_id);

    let mut image_data: Option<axum::body::Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServiceError::InvalidInput(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("unknown").to_string();

        if field_name == "file" {
            if let Some(content_type) = field.content_type() {
                tracing::debug!("Upload content type: {}", content_type);
            }

            let data = field.bytes().await.map_err(|e| {
                ServiceError::InvalidInput(format!("Failed to read file data: {}", e))
            })?;

            tracing::debug!("Received file: {} bytes", data.len());
            image_data = Some(data);
        } else {
            tracing::debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let image_data = image_data
        .ok_or_else(|| ServiceError::InvalidInput("No image file provided".to_string()))?;

    // 解码与推理为CPU密集型任务
    let worker_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        PredictionPipeline::process_bytes(&worker_state.models, &image_data)
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("Prediction task failed: {}", e)))??;

    tracing::info!(
        "Prediction completed: request_id={}, prediction={}, confidence={:.4}, time={:.3}s",
        request_id,
        result.prediction,
        result.confidence,
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(result))
}
