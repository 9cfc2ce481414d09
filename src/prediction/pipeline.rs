use crate::{
    image::{ImageLoader, ImagePreprocessor},
    models::{InferenceEngine, ModelManager},
    prediction::PredictionResult,
    utils::error::ServiceError,
    Result,
};
use std::time::Instant;

/// 预测流水线：解码 → 预处理 → 推理 → 结果格式化
pub struct PredictionPipeline;

impl PredictionPipeline {
    /// 处理上传的图像字节
    pub fn process_bytes<E: InferenceEngine>(
        manager: &ModelManager<E>,
        bytes: &[u8],
    ) -> Result<PredictionResult> {
        // 演示模式下不解码图像
        manager.ensure_loaded()?;

        let start_time = Instant::now();

        let image = ImageLoader::from_bytes(bytes)?;
        let input = ImagePreprocessor::preprocess(&image);
        let preprocessing_time = start_time.elapsed();

        let inference_start = Instant::now();
        let predictions = manager.infer(input.view())?;
        let inference_time = inference_start.elapsed();

        if predictions.nrows() != 1 {
            return Err(ServiceError::Inference(format!(
                "Expected batch size 1, got {}",
                predictions.nrows()
            )));
        }

        let probabilities: Vec<f32> = predictions.row(0).to_vec();
        let result = PredictionResult::from_probabilities(&probabilities)?;

        tracing::debug!(
            "Prediction timings: preprocess={:.3}s, inference={:.3}s",
            preprocessing_time.as_secs_f32(),
            inference_time.as_secs_f32()
        );

        Ok(result)
    }
}
