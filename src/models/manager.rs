use crate::models::InferenceEngine;
use crate::utils::error::ServiceError;
use crate::Result;
use ndarray::{Array2, ArrayView4};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 成功加载的模型及其来源文件
pub struct LoadedModel<H> {
    pub path: PathBuf,
    pub handle: H,
}

/// 模型管理器：启动时加载一次，之后只读
pub struct ModelManager<E: InferenceEngine> {
    engine: E,
    active: Option<LoadedModel<E::Handle>>,
    expected_file: String,
}

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMode {
    ModelLoaded,
    Demo,
}

/// 模型统计信息
#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub mode: ServiceMode,
    pub model_file: Option<String>,
}

impl<E: InferenceEngine> ModelManager<E> {
    /// 按候选顺序加载模型，全部失败时进入演示模式
    pub fn init(engine: E, candidates: &[PathBuf], expected_file: impl Into<String>) -> Self {
        tracing::info!("Initializing model manager...");

        let active = Self::load_first(&engine, candidates);
        match &active {
            Some(model) => {
                tracing::info!("Model manager initialized with {}", model.path.display())
            }
            None => tracing::warn!("No model loaded. API will run in demo mode."),
        }

        Self {
            engine,
            active,
            expected_file: expected_file.into(),
        }
    }

    /// 依次尝试候选路径，返回第一个加载成功的模型
    pub fn load_first(engine: &E, candidates: &[PathBuf]) -> Option<LoadedModel<E::Handle>> {
        for path in candidates {
            if !path.exists() {
                tracing::debug!("Model candidate not found, skipping: {}", path.display());
                continue;
            }

            match engine.load(path) {
                Ok(handle) => {
                    tracing::info!("Loaded model: {}", path.display());
                    return Some(LoadedModel {
                        path: path.clone(),
                        handle,
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        None
    }

    pub fn is_loaded(&self) -> bool {
        self.active.is_some()
    }

    pub fn mode(&self) -> ServiceMode {
        if self.is_loaded() {
            ServiceMode::ModelLoaded
        } else {
            ServiceMode::Demo
        }
    }

    /// 当前模型文件路径
    pub fn model_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|model| model.path.as_path())
    }

    /// 演示模式下返回 ModelUnavailable
    pub fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(self.unavailable())
        }
    }

    /// 使用已加载模型推理
    pub fn infer(&self, input: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
        let model = self.active.as_ref().ok_or_else(|| self.unavailable())?;
        self.engine.infer(&model.handle, input)
    }

    pub fn get_stats(&self) -> ModelStats {
        ModelStats {
            mode: self.mode(),
            model_file: self
                .model_path()
                .and_then(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }

    fn unavailable(&self) -> ServiceError {
        ServiceError::ModelUnavailable {
            expected_file: self.expected_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// 记录加载尝试的桩引擎，文件名含 "broken" 时加载失败
    #[derive(Default)]
    struct RecordingEngine {
        attempts: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl InferenceEngine for RecordingEngine {
        type Handle = String;

        fn load(&self, path: &Path) -> Result<String> {
            self.attempts.lock().push(path.to_path_buf());
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            if name.contains("broken") {
                Err(ServiceError::ModelLoad(format!("corrupt file {}", name)))
            } else {
                Ok(name)
            }
        }

        fn infer(&self, _: &String, input: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
            Ok(Array2::from_elem((input.shape()[0], 4), 0.25))
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"weights").unwrap();
        path
    }

    #[test]
    fn first_loadable_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("best_model.onnx");
        let broken = touch(dir.path(), "broken.onnx");
        let good = touch(dir.path(), "bestmodel.onnx");
        let later = touch(dir.path(), "zzz.onnx");

        let engine = RecordingEngine::default();
        let attempts = Arc::clone(&engine.attempts);
        let manager = ModelManager::init(
            engine,
            &[missing, broken.clone(), good.clone(), later],
            "best_model.onnx",
        );

        assert!(manager.is_loaded());
        assert_eq!(manager.model_path(), Some(good.as_path()));
        // 不存在的文件不尝试加载，成功后停止
        assert_eq!(*attempts.lock(), vec![broken, good]);
        assert_eq!(manager.mode(), ServiceMode::ModelLoaded);
        assert_eq!(manager.get_stats().model_file.as_deref(), Some("bestmodel.onnx"));
    }

    #[test]
    fn no_candidates_means_demo_mode() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RecordingEngine::default();
        let attempts = Arc::clone(&engine.attempts);
        let manager = ModelManager::init(
            engine,
            &[dir.path().join("a.onnx"), dir.path().join("b.onnx")],
            "a.onnx",
        );

        assert!(!manager.is_loaded());
        assert!(attempts.lock().is_empty());
        assert_eq!(manager.mode(), ServiceMode::Demo);
        assert!(manager.get_stats().model_file.is_none());
    }

    #[test]
    fn all_failures_mean_demo_mode() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "broken_a.onnx");
        let b = touch(dir.path(), "broken_b.onnx");

        let manager = ModelManager::init(RecordingEngine::default(), &[a, b], "best_model.onnx");
        assert!(!manager.is_loaded());

        let err = manager.infer(ndarray::Array4::<f32>::zeros((1, 224, 224, 3)).view()).unwrap_err();
        match err {
            ServiceError::ModelUnavailable { expected_file } => {
                assert_eq!(expected_file, "best_model.onnx")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(manager.ensure_loaded().is_err());
    }

    #[test]
    fn loaded_model_forwards_inference() {
        let dir = tempfile::tempdir().unwrap();
        let good = touch(dir.path(), "best_model.onnx");
        let manager = ModelManager::init(RecordingEngine::default(), &[good], "best_model.onnx");

        let output = manager
            .infer(ndarray::Array4::<f32>::zeros((1, 224, 224, 3)).view())
            .unwrap();
        assert_eq!(output.shape(), &[1, 4]);
        assert!(manager.ensure_loaded().is_ok());
    }
}
