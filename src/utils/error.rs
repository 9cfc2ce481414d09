use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// 没有可用模型（演示模式）
    #[error("Model not loaded. Please download the model file and place it in the root directory.")]
    ModelUnavailable { expected_file: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// 预测接口的错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            ServiceError::ModelUnavailable { .. } => "MODEL_NOT_LOADED",
            ServiceError::Inference(_) => "INFERENCE_ERROR",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::Config(_) => "CONFIG_ERROR",
            ServiceError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            ServiceError::Ort(_) => "ORT_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 转换为带内错误响应体
    pub fn to_body(&self) -> ErrorBody {
        match self {
            ServiceError::ModelUnavailable { expected_file } => ErrorBody {
                error: self.to_string(),
                instructions: Some(format!(
                    "Download model from releases page and place as '{}'",
                    expected_file
                )),
            },
            other => ErrorBody {
                error: format!("Failed to process image: {}", other),
                instructions: None,
            },
        }
    }
}

// 错误通过响应体返回，HTTP状态码始终为200
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::ModelUnavailable { .. } => {
                tracing::warn!("Prediction rejected: model not loaded");
            }
            other => {
                tracing::error!("Request failed: {} ({})", other, other.error_code());
            }
        }

        (StatusCode::OK, axum::Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_unavailable_carries_instructions() {
        let err = ServiceError::ModelUnavailable {
            expected_file: "best_model.onnx".to_string(),
        };
        let body = err.to_body();

        assert_eq!(
            body.error,
            "Model not loaded. Please download the model file and place it in the root directory."
        );
        assert_eq!(
            body.instructions.as_deref(),
            Some("Download model from releases page and place as 'best_model.onnx'")
        );
    }

    #[test]
    fn processing_errors_are_prefixed() {
        let err = ServiceError::InvalidInput("No image file provided".to_string());
        let body = err.to_body();

        assert_eq!(
            body.error,
            "Failed to process image: Invalid input: No image file provided"
        );
        assert!(body.instructions.is_none());
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn error_response_is_200() {
        let response = ServiceError::Inference("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
