pub mod config;
pub mod download;
pub mod image;
pub mod models;
pub mod prediction;
pub mod utils;
pub mod web;

// 重新导出主要类型
pub use config::Config;
pub use prediction::{ClassLabel, PredictionResult};
pub use utils::error::ServiceError;

pub type Result<T> = std::result::Result<T, ServiceError>;
