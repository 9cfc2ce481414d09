use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// 模型输入边长
pub const INPUT_SIZE: u32 = 224;

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// 分类模型预处理：缩放到224x224（不保持宽高比），归一化到[0,1]，添加batch维度
    ///
    /// 输出为NHWC布局，形状 (1, 224, 224, 3)。
    pub fn preprocess(image: &DynamicImage) -> Array4<f32> {
        let resized = image
            .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
            .to_rgb8();

        let size = INPUT_SIZE as usize;
        Array4::from_shape_fn((1, size, size, 3), |(_, h, w, c)| {
            resized.get_pixel(w as u32, h as u32)[c] as f32 / 255.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    #[test]
    fn output_shape_is_fixed() {
        for (w, h) in [(512, 512), (37, 401), (224, 224), (1, 1)] {
            let img: RgbImage = ImageBuffer::from_pixel(w, h, Rgb([12, 200, 99]));
            let tensor = ImagePreprocessor::preprocess(&DynamicImage::ImageRgb8(img));
            assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        }
    }

    #[test]
    fn values_are_in_unit_range() {
        let img: RgbImage = ImageBuffer::from_fn(300, 120, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        });
        let tensor = ImagePreprocessor::preprocess(&DynamicImage::ImageRgb8(img));
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn uniform_image_rescales_linearly() {
        let img: RgbImage = ImageBuffer::from_pixel(64, 64, Rgb([255, 0, 51]));
        let tensor = ImagePreprocessor::preprocess(&DynamicImage::ImageRgb8(img));

        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 100, 100, 1]].abs() < 1e-6);
        assert!((tensor[[0, 100, 100, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn channel_layout_is_hwc() {
        // 左半红、右半蓝
        let img: RgbImage = ImageBuffer::from_fn(224, 224, |x, _| {
            if x < 112 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let tensor = ImagePreprocessor::preprocess(&DynamicImage::ImageRgb8(img));

        assert!((tensor[[0, 10, 5, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 10, 5, 2]].abs() < 1e-6);
        assert!((tensor[[0, 10, 220, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let img: RgbImage = ImageBuffer::from_fn(97, 53, |x, y| Rgb([x as u8, y as u8, 7]));
        let img = DynamicImage::ImageRgb8(img);
        assert_eq!(ImagePreprocessor::preprocess(&img), ImagePreprocessor::preprocess(&img));
    }
}
