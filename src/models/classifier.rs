use crate::classify::labels::NUM_CLASSES;
use crate::utils::error::ClassifierError;
use crate::{Config, Result};
use ndarray::Array4;
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// 叶片病害分类器
///
/// 包装一个冻结的MobileNetV2 ONNX会话，输入为NHWC (1, 224, 224, 3)，
/// 输出为长度3的概率向量。会话在进程内共享，推理串行执行。
pub struct LeafClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,  // 动态发现的输入名称
    output_name: String, // 动态发现的输出名称
}

impl LeafClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        let model_path = config.model_path();

        if !model_path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Classification model not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading classification model from: {}", model_path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.onnx_config.intra_threads)?
            .commit_from_file(&model_path)?;

        // 动态发现输入名称
        let input_name = if session.inputs.is_empty() {
            return Err(ClassifierError::ModelLoad(
                "Classification model has no inputs".to_string(),
            ));
        } else {
            session.inputs[0].name.clone()
        };

        // 动态发现输出名称
        let output_name = if session.outputs.is_empty() {
            return Err(ClassifierError::ModelLoad(
                "Classification model has no outputs".to_string(),
            ));
        } else {
            let output_name = session.outputs[0].name.clone();
            tracing::info!(
                "Classification model io: input='{}', output='{}'",
                input_name,
                output_name
            );

            // 记录所有可用输出用于调试
            for (i, output) in session.outputs.iter().enumerate() {
                tracing::debug!("Classification output[{}]: '{}'", i, output.name);
            }

            output_name
        };

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
        })
    }

    /// 单次前向推理
    ///
    /// 输入张量保持原始0-255像素值。训练侧的归一化层已冻结进模型
    /// 产物，这里不做额外缩放，避免与训练流水线产生偏差。
    pub fn predict(&self, input: Array4<f32>) -> Result<[f32; NUM_CLASSES]> {
        let input_tensor = Tensor::from_array(input)?;

        let predictions = {
            let mut session = self.session.lock();
            let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

            // 使用动态发现的输出名称
            match outputs.get(&self.output_name) {
                Some(output) => output.try_extract_array::<f32>()?.into_owned(),
                None => {
                    // 提供详细的错误诊断信息
                    let available_outputs: Vec<String> =
                        outputs.keys().map(|s| s.to_string()).collect();
                    return Err(ClassifierError::Inference(format!(
                        "Classification output '{}' not found. Available outputs: {:?}",
                        self.output_name, available_outputs
                    )));
                }
            }
        };

        // 输出形状应为 (1, 3)；形状不符视为致命的单次请求失败
        let flat: Vec<f32> = predictions.iter().copied().collect();
        if flat.len() != NUM_CLASSES {
            return Err(ClassifierError::Inference(format!(
                "Expected {} class scores, model produced {} (shape {:?})",
                NUM_CLASSES,
                flat.len(),
                predictions.shape()
            )));
        }

        Ok([flat[0], flat[1], flat[2]])
    }
}
