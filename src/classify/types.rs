use crate::classify::labels::{ClassInfo, CLASSES, NUM_CLASSES};
use serde::{Deserialize, Serialize};

/// 单个类别的概率条目（顺序与类别表一致）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassProbability {
    /// 类别短名称
    pub name: String,
    /// 完整病害名称
    pub full_name: String,
    /// UI展示颜色
    pub color: String,
    /// 概率 (0.0 - 1.0)
    pub probability: f32,
}

/// 完整的分类结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// 预测类别（argmax对应的短名称）
    pub label: String,
    /// 完整病害名称
    pub full_name: String,
    /// 置信度，恒等于distribution[argmax]
    pub confidence: f32,
    /// 按固定类别顺序排列的概率向量
    pub distribution: Vec<f32>,
    /// 每个类别的概率明细（含UI颜色）
    pub probabilities: Vec<ClassProbability>,
    /// 处理耗时（秒）
    pub processing_time: f32,
    /// 模型信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfo>,
}

impl Prediction {
    /// 从原始概率向量构建结果
    pub fn from_scores(scores: [f32; NUM_CLASSES], processing_time: f32) -> Self {
        let (top_idx, confidence) = crate::classify::labels::top_class(&scores);
        let top: &ClassInfo = &CLASSES[top_idx];

        let probabilities = CLASSES
            .iter()
            .zip(scores.iter())
            .map(|(class, &probability)| ClassProbability {
                name: class.name.to_string(),
                full_name: class.full_name.to_string(),
                color: class.color.to_string(),
                probability,
            })
            .collect();

        Self {
            label: top.name.to_string(),
            full_name: top.full_name.to_string(),
            confidence,
            distribution: scores.to_vec(),
            probabilities,
            processing_time,
            model_info: Some(ModelInfo::default()),
        }
    }
}

/// 模型信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// 模型架构
    pub architecture: String,
    /// 输入尺寸
    pub input_size: [u32; 2],
    /// 类别数量
    pub num_classes: usize,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            architecture: "MobileNetV2".to_string(),
            input_size: [
                crate::image::preprocessing::INPUT_WIDTH,
                crate::image::preprocessing::INPUT_HEIGHT,
            ],
            num_classes: NUM_CLASSES,
        }
    }
}

/// 分类处理阶段
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifyStage {
    Preprocessing,
    Inference,
    Completed,
    Error,
}

/// 分类处理状态（开发模式下的进度上报）
#[derive(Debug, Clone)]
pub struct ClassifyStatus {
    /// 当前处理阶段
    pub stage: ClassifyStage,
    /// 进度百分比 (0.0 - 1.0)
    pub progress: f32,
    /// 状态消息
    pub message: String,
}

impl ClassifyStatus {
    pub fn new(stage: ClassifyStage, progress: f32, message: &str) -> Self {
        Self {
            stage,
            progress,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_from_scores_maps_label() {
        let prediction = Prediction::from_scores([0.05, 0.15, 0.8], 0.1);
        assert_eq!(prediction.label, "Healthy");
        assert_eq!(prediction.full_name, "Healthy");
        assert_eq!(prediction.confidence, 0.8);
        assert_eq!(prediction.distribution, vec![0.05, 0.15, 0.8]);
    }

    #[test]
    fn test_prediction_distribution_is_valid() {
        let prediction = Prediction::from_scores([0.7, 0.2, 0.1], 0.0);
        assert_eq!(prediction.distribution.len(), 3);
        assert!(prediction.distribution.iter().all(|&p| p >= 0.0));
        let sum: f32 = prediction.distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);
    }

    #[test]
    fn test_prediction_tie_break_first_class_wins() {
        let prediction = Prediction::from_scores([0.45, 0.45, 0.1], 0.0);
        assert_eq!(prediction.label, "CBSD");
        assert_eq!(prediction.full_name, "Cassava Brown Streak Disease");
    }

    #[test]
    fn test_probabilities_keep_class_order_and_colors() {
        let prediction = Prediction::from_scores([0.2, 0.3, 0.5], 0.0);
        let names: Vec<&str> = prediction
            .probabilities
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["CBSD", "CMD", "Healthy"]);
        assert_eq!(prediction.probabilities[0].color, "#ff6b6b");
        assert_eq!(prediction.probabilities[1].color, "#ffa500");
        assert_eq!(prediction.probabilities[2].color, "#51cf66");
        assert_eq!(prediction.probabilities[2].probability, 0.5);
    }

    #[test]
    fn test_prediction_serializes_to_plain_record() {
        let prediction = Prediction::from_scores([0.1, 0.2, 0.7], 0.25);
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["label"], "Healthy");
        assert_eq!(json["distribution"].as_array().unwrap().len(), 3);
        assert_eq!(json["model_info"]["architecture"], "MobileNetV2");
    }
}
