use crate::utils::error::ClassifierError;
use crate::Result;
use axum::body::Bytes;
use base64::Engine;
use image::{DynamicImage, ImageFormat};

/// 图像字节数上限（与请求体限制保持一致）
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

pub struct ImageLoader;

impl ImageLoader {
    /// 从base64字符串加载图像
    pub fn from_base64(base64_data: &str) -> Result<DynamicImage> {
        // 检测并移除可能的数据URL前缀 (data:image/xxx;base64,)
        let base64_clean = if base64_data.starts_with("data:") {
            base64_data.split(',').nth(1).unwrap_or(base64_data)
        } else {
            base64_data
        };

        // 解码base64
        let image_bytes = base64::engine::general_purpose::STANDARD
            .decode(base64_clean)
            .map_err(ClassifierError::Base64)?;

        // 检查文件大小
        if image_bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClassifierError::FileTooLarge(
                image_bytes.len(),
                MAX_IMAGE_BYTES,
            ));
        }

        // 解码图像；损坏的字节流在这里失败，不会进入预处理
        let image = image::load_from_memory(&image_bytes).map_err(ClassifierError::ImageDecode)?;

        Ok(image)
    }

    /// 从字节流加载图像
    pub fn from_bytes(bytes: Bytes) -> Result<DynamicImage> {
        // 检查文件大小
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClassifierError::FileTooLarge(bytes.len(), MAX_IMAGE_BYTES));
        }

        let image = image::load_from_memory(&bytes).map_err(ClassifierError::ImageDecode)?;

        Ok(image)
    }

    /// 从文件路径加载图像
    pub fn from_path(path: &str) -> Result<DynamicImage> {
        let image = image::open(path).map_err(ClassifierError::ImageDecode)?;

        Ok(image)
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// 验证图像格式是否支持
    pub fn is_supported_format(format: ImageFormat) -> bool {
        matches!(
            format,
            ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Bmp
                | ImageFormat::Tiff
                | ImageFormat::WebP
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb::<u8>([10, 200, 30]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let bytes = Bytes::from(png_bytes(32, 16));
        let image = ImageLoader::from_bytes(bytes).unwrap();
        assert_eq!(image.width(), 32);
        assert_eq!(image.height(), 16);
    }

    #[test]
    fn test_from_base64_with_data_url_prefix() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(8, 8));
        let data_url = format!("data:image/png;base64,{}", encoded);

        let image = ImageLoader::from_base64(&data_url).unwrap();
        assert_eq!(image.width(), 8);

        // 无前缀的裸base64同样可用
        let image = ImageLoader::from_base64(&encoded).unwrap();
        assert_eq!(image.height(), 8);
    }

    #[test]
    fn test_corrupt_bytes_fail_as_decode_error() {
        let bytes = Bytes::from_static(b"definitely not an image");
        match ImageLoader::from_bytes(bytes) {
            Err(ClassifierError::ImageDecode(_)) => {}
            other => panic!("expected ImageDecode error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_truncated_png_fails_before_preprocessing() {
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            ImageLoader::from_bytes(Bytes::from(bytes)),
            Err(ClassifierError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        assert!(matches!(
            ImageLoader::from_base64("@@not-base64@@"),
            Err(ClassifierError::Base64(_))
        ));
    }

    #[test]
    fn test_format_allow_list() {
        let bytes = png_bytes(4, 4);
        let format = ImageLoader::detect_format(&bytes).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert!(ImageLoader::is_supported_format(format));
        assert!(!ImageLoader::is_supported_format(ImageFormat::Gif));
    }
}
