use crate::config::OnnxConfig;
use crate::models::InferenceEngine;
use crate::utils::error::ServiceError;
use crate::Result;
use ndarray::{Array2, ArrayView4, Ix2};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::path::Path;

/// 基于 ONNX Runtime 的推理引擎
pub struct OrtEngine {
    intra_threads: usize,
    optimization_level: u8,
}

/// 已加载的 ONNX 会话
pub struct OrtModel {
    session: Mutex<Session>,
    input_name: String,  // 动态发现的输入名称
    output_name: String, // 动态发现的输出名称
}

impl OrtEngine {
    pub fn new(config: &OnnxConfig) -> Self {
        Self {
            intra_threads: config.intra_threads,
            optimization_level: config.optimization_level,
        }
    }

    fn graph_optimization_level(&self) -> GraphOptimizationLevel {
        match self.optimization_level {
            0 => GraphOptimizationLevel::Disable,
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        }
    }
}

impl InferenceEngine for OrtEngine {
    type Handle = OrtModel;

    fn load(&self, path: &Path) -> Result<OrtModel> {
        tracing::info!("Loading classification model from: {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(self.graph_optimization_level())?
            .with_intra_threads(self.intra_threads)?
            .commit_from_file(path)?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => {
                return Err(ServiceError::ModelLoad(format!(
                    "Model {} has no inputs",
                    path.display()
                )))
            }
        };

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => {
                return Err(ServiceError::ModelLoad(format!(
                    "Model {} has no outputs",
                    path.display()
                )))
            }
        };

        tracing::info!(
            "Classification model I/O: input='{}', output='{}'",
            input_name,
            output_name
        );

        Ok(OrtModel {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn infer(&self, model: &OrtModel, input: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
        let input_tensor = Tensor::from_array(input.to_owned())?;

        let predictions = {
            let mut session = model.session.lock();
            let outputs = session.run(inputs![model.input_name.as_str() => input_tensor])?;

            match outputs.get(model.output_name.as_str()) {
                Some(output) => output.try_extract_array::<f32>()?.into_owned(),
                None => {
                    let available_outputs: Vec<String> =
                        outputs.keys().map(|s| s.to_string()).collect();
                    return Err(ServiceError::Inference(format!(
                        "Output '{}' not found. Available outputs: {:?}",
                        model.output_name, available_outputs
                    )));
                }
            }
        };

        predictions.into_dimensionality::<Ix2>().map_err(|e| {
            ServiceError::Inference(format!("Expected 2D probability tensor: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_model_file_fails_to_load() {
        let engine = OrtEngine::new(&OnnxConfig {
            intra_threads: 1,
            optimization_level: 3,
        });
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("broken.onnx");
        std::fs::write(&bogus, b"not a protobuf graph").unwrap();

        assert!(engine.load(&bogus).is_err());
    }
}
