use crate::utils::error::ServiceError;
use crate::Result;
use image::{DynamicImage, ImageFormat};

pub struct ImageLoader;

impl ImageLoader {
    /// 从字节流加载图像并转换为RGB
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("Empty file".to_string()));
        }

        if let Some(format) = Self::detect_format(bytes) {
            tracing::debug!("Detected image format: {:?}", format);
        }

        let image = image::load_from_memory(bytes)?;

        // 统一为3通道（灰度、RGBA等均转换）
        Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}
