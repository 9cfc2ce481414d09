use crate::utils::error::ServiceError;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// 肿瘤类别，顺序必须与训练时一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    Glioma,
    Meningioma,
    Notumor,
    Pituitary,
}

impl ClassLabel {
    /// 按模型输出下标排列
    pub const ALL: [ClassLabel; 4] = [
        ClassLabel::Glioma,
        ClassLabel::Meningioma,
        ClassLabel::Notumor,
        ClassLabel::Pituitary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Glioma => "glioma",
            ClassLabel::Meningioma => "meningioma",
            ClassLabel::Notumor => "notumor",
            ClassLabel::Pituitary => "pituitary",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次预测结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: ClassLabel,
    pub class_index: usize,
    pub confidence: f32,
    pub all_probabilities: BTreeMap<ClassLabel, f32>,
}

impl PredictionResult {
    /// 从单个样本的概率向量构造结果
    ///
    /// 取第一个最大值作为预测类别；长度必须等于类别数。
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        if probabilities.len() != ClassLabel::ALL.len() {
            return Err(ServiceError::Inference(format!(
                "Expected {} class probabilities, got {}",
                ClassLabel::ALL.len(),
                probabilities.len()
            )));
        }

        let (class_index, confidence) = probabilities.iter().copied().enumerate().fold(
            (0, probabilities[0]),
            |(best_idx, best), (idx, prob)| {
                if prob > best {
                    (idx, prob)
                } else {
                    (best_idx, best)
                }
            },
        );

        let all_probabilities = ClassLabel::ALL
            .iter()
            .copied()
            .zip(probabilities.iter().copied())
            .collect();

        Ok(Self {
            prediction: ClassLabel::ALL[class_index],
            class_index,
            confidence,
            all_probabilities,
        })
    }
}
