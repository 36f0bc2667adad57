use crate::{
    classify::{ClassifyStage, ClassifyStatus, Prediction},
    image::{ImageLoader, Preprocessor},
    models::get_classifier,
    Result,
};
use image::DynamicImage;
use std::time::Instant;
use tokio::sync::mpsc;

/// 分类处理流水线
///
/// 解码 → 预处理 → 单次前向推理 → argmax。每次请求都是一次阻塞的
/// 同步调用，失败只影响当前请求，不影响已加载的模型句柄。
pub struct ClassifyPipeline;

impl ClassifyPipeline {
    /// 处理base64图像
    pub async fn process_base64(
        base64_data: &str,
        status_tx: Option<mpsc::UnboundedSender<ClassifyStatus>>,
    ) -> Result<Prediction> {
        let start_time = Instant::now();

        // 发送预处理状态
        if let Some(ref tx) = status_tx {
            let _ = tx.send(ClassifyStatus::new(
                ClassifyStage::Preprocessing,
                0.1,
                "Loading image from base64",
            ));
        }

        // 加载图像
        let image = ImageLoader::from_base64(base64_data)?;

        Self::process_image(image, status_tx, start_time).await
    }

    /// 处理字节流图像
    pub async fn process_bytes(
        bytes: axum::body::Bytes,
        status_tx: Option<mpsc::UnboundedSender<ClassifyStatus>>,
    ) -> Result<Prediction> {
        let start_time = Instant::now();

        // 发送预处理状态
        if let Some(ref tx) = status_tx {
            let _ = tx.send(ClassifyStatus::new(
                ClassifyStage::Preprocessing,
                0.1,
                "Loading image from stream",
            ));
        }

        // 加载图像
        let image = ImageLoader::from_bytes(bytes)?;

        Self::process_image(image, status_tx, start_time).await
    }

    /// 核心分类流水线
    async fn process_image(
        image: DynamicImage,
        status_tx: Option<mpsc::UnboundedSender<ClassifyStatus>>,
        start_time: Instant,
    ) -> Result<Prediction> {
        // 图像预处理
        if let Some(ref tx) = status_tx {
            let _ = tx.send(ClassifyStatus::new(
                ClassifyStage::Preprocessing,
                0.3,
                "Resizing image to model input",
            ));
        }

        let input = Preprocessor::to_model_input(&image);

        // 前向推理
        if let Some(ref tx) = status_tx {
            let _ = tx.send(ClassifyStatus::new(
                ClassifyStage::Inference,
                0.6,
                "Running forward pass",
            ));
        }

        let classifier = get_classifier()?;
        let scores = classifier.predict(input)?;

        let total_time = start_time.elapsed();
        let prediction = Prediction::from_scores(scores, total_time.as_secs_f32());

        // 发送完成状态
        if let Some(ref tx) = status_tx {
            let _ = tx.send(ClassifyStatus::new(
                ClassifyStage::Completed,
                1.0,
                &format!(
                    "Classified as {} ({:.1}%)",
                    prediction.label,
                    prediction.confidence * 100.0
                ),
            ));
        }

        tracing::info!(
            "Classification completed: label={}, confidence={:.3}, time={:.3}s",
            prediction.label,
            prediction.confidence,
            total_time.as_secs_f32()
        );

        Ok(prediction)
    }
}
