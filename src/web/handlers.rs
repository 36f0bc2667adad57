use crate::{
    classify::{ClassifyPipeline, ClassifyStatus, Prediction},
    utils::error::ClassifierError,
    web::extractors::{RequestId, ValidatedJson},
    Config, Result,
};
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::sync::mpsc;

/// JSON请求体（base64模式）
#[derive(Debug, Deserialize)]
pub struct ClassifyJsonRequest {
    /// Base64编码的图像数据
    pub image: String,
}

/// JSON响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub timestamp: String,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, request_id: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id,
        }
    }

    pub fn error(code: String, message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError { code, message }),
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// 开发模式下启动后台任务打印流水线进度
fn spawn_status_logger(
    config: &Config,
    request_id: String,
) -> Option<mpsc::UnboundedSender<ClassifyStatus>> {
    if !config.dev_mode {
        return None;
    }

    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<ClassifyStatus>();
    tokio::spawn(async move {
        while let Some(status) = status_rx.recv().await {
            tracing::debug!(
                "Classify progress [{}]: {:?} - {:.1}% - {}",
                request_id,
                status.stage,
                status.progress * 100.0,
                status.message
            );
        }
    });

    Some(status_tx)
}

/// JSON base64上传处理器
pub async fn classify_json_handler(
    State(config): State<Config>,
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<ClassifyJsonRequest>,
) -> Result<Json<ApiResponse<Prediction>>> {
    let start_time = Instant::now();

    tracing::info!("Processing JSON classify request: request_id={}", request_id);

    let status_tx = spawn_status_logger(&config, request_id.clone());

    // 执行分类
    let prediction = ClassifyPipeline::process_base64(&request.image, status_tx).await?;

    let processing_time = start_time.elapsed();

    tracing::info!(
        "JSON classify completed: request_id={}, label={}, confidence={:.3}, time={:.3}s",
        request_id,
        prediction.label,
        prediction.confidence,
        processing_time.as_secs_f32()
    );

    Ok(Json(ApiResponse::success(prediction, request_id)))
}

/// Multipart文件上传处理器
pub async fn classify_upload_handler(
    State(config): State<Config>,
    RequestId(request_id): RequestId,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Prediction>>> {
    let start_time = Instant::now();

    tracing::info!(
        "Processing multipart classify request: request_id={}",
        request_id
    );

    let mut image_data: Option<axum::body::Bytes> = None;

    // 解析multipart数据
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ClassifierError::InvalidInput(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("unknown").to_string();

        match field_name.as_str() {
            "file" => {
                // 验证内容类型
                if let Some(content_type) = field.content_type() {
                    if !content_type.starts_with("image/") {
                        return Err(ClassifierError::UnsupportedFormat(content_type.to_string()));
                    }
                }

                // 读取文件数据
                let data = field.bytes().await.map_err(|e| {
                    ClassifierError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;

                if data.is_empty() {
                    return Err(ClassifierError::InvalidInput("Empty file".to_string()));
                }

                tracing::debug!("Received file: {} bytes", data.len());
                image_data = Some(data);
            }
            _ => {
                tracing::debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    // 验证必需的图像数据
    let image_data = image_data
        .ok_or_else(|| ClassifierError::InvalidInput("No image file provided".to_string()))?;

    let status_tx = spawn_status_logger(&config, request_id.clone());

    // 执行分类
    let prediction = ClassifyPipeline::process_bytes(image_data, status_tx).await?;

    let processing_time = start_time.elapsed();

    tracing::info!(
        "Upload classify completed: request_id={}, label={}, confidence={:.3}, time={:.3}s",
        request_id,
        prediction.label,
        prediction.confidence,
        processing_time.as_secs_f32()
    );

    Ok(Json(ApiResponse::success(prediction, request_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success_envelope() {
        let prediction = Prediction::from_scores([0.1, 0.2, 0.7], 0.05);
        let response = ApiResponse::success(prediction, "req-1".to_string());
        assert!(response.success);
        assert!(response.error.is_none());
        assert_eq!(response.request_id, "req-1");
        assert_eq!(response.data.unwrap().label, "Healthy");
    }

    #[test]
    fn test_api_response_error_envelope() {
        let response =
            ApiResponse::<()>::error("INVALID_INPUT".to_string(), "Empty image data".to_string());
        assert!(!response.success);
        assert!(response.data.is_none());
        let err = response.error.unwrap();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.message, "Empty image data");
    }
}
