use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

/// 模型输入宽度
pub const INPUT_WIDTH: u32 = 224;
/// 模型输入高度
pub const INPUT_HEIGHT: u32 = 224;
/// 模型输入通道数
pub const INPUT_CHANNELS: usize = 3;

pub struct Preprocessor;

impl Preprocessor {
    /// 把解码后的图像转换为模型输入张量
    ///
    /// 流程与训练侧完全一致：
    /// 1. 非RGB图像（灰度、RGBA、调色板）先转换为三通道RGB；
    /// 2. 缩放（不是裁剪）到224x224，不保持宽高比——非正方形图像
    ///    会被拉伸变形，这是有意为之，与训练数据处理一致；
    /// 3. 插入batch维度，得到NHWC (1, 224, 224, 3)。
    ///
    /// 像素值保持原始0-255范围。这里不做任何强度归一化：训练导出
    /// 的模型自带预处理层，额外缩放会改变预测结果。
    pub fn to_model_input(image: &DynamicImage) -> Array4<f32> {
        // 先转换为三通道RGB，再缩放到固定输入尺寸
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8())
            .resize_exact(INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle)
            .to_rgb8();

        let mut tensor = Array4::<f32>::zeros((
            1,
            INPUT_HEIGHT as usize,
            INPUT_WIDTH as usize,
            INPUT_CHANNELS,
        ));

        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..INPUT_CHANNELS {
                tensor[[0, y as usize, x as usize, c]] = pixel.0[c] as f32;
            }
        }

        tensor
    }
}
