use crate::Result;
use ndarray::{Array2, ArrayView4};
use std::path::Path;

/// 推理引擎抽象：加载模型、执行推理
///
/// 服务层只依赖这两个能力，测试中可以替换为桩实现。
pub trait InferenceEngine: Send + Sync + 'static {
    /// 已加载模型的句柄，启动后只读共享
    type Handle: Send + Sync + 'static;

    /// 从文件加载模型
    fn load(&self, path: &Path) -> Result<Self::Handle>;

    /// 对 (N, 224, 224, 3) 输入执行推理，返回 (N, num_classes) 概率
    fn infer(&self, handle: &Self::Handle, input: ArrayView4<'_, f32>) -> Result<Array2<f32>>;
}
