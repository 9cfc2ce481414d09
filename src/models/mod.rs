pub mod engine;
pub mod manager;
pub mod onnx;

pub use engine::InferenceEngine;
pub use manager::{LoadedModel, ModelManager, ModelStats, ServiceMode};
pub use onnx::{OrtEngine, OrtModel};
