use crate::models::LeafClassifier;
use crate::utils::error::ClassifierError;
use crate::{Config, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 全局模型管理器单例
pub struct ModelManager {
    classifier: Arc<LeafClassifier>,
    config: Config,
}

static MODEL_MANAGER: OnceCell<Arc<ModelManager>> = OnceCell::new();

impl ModelManager {
    /// 初始化全局模型管理器
    ///
    /// 模型加载开销大，进程生命周期内最多执行一次。并发首次调用
    /// 由OnceCell保证只有一次加载胜出，其余调用者阻塞后共享同一
    /// 句柄；加载失败时单元保持为空，所有预测请求都会被拒绝。
    pub fn init(config: Config) -> Result<Arc<ModelManager>> {
        let manager = MODEL_MANAGER.get_or_try_init(|| -> Result<Arc<ModelManager>> {
            tracing::info!("Initializing model manager...");

            let classifier = Arc::new(LeafClassifier::new(&config)?);

            tracing::info!("Model manager initialized successfully");
            Ok(Arc::new(ModelManager { classifier, config }))
        })?;

        Ok(Arc::clone(manager))
    }

    /// 获取全局模型管理器实例
    pub fn instance() -> Result<Arc<ModelManager>> {
        MODEL_MANAGER.get().cloned().ok_or_else(|| {
            ClassifierError::ModelLoad("Model manager not initialized".to_string())
        })
    }

    /// 获取分类器引用
    pub fn classifier(&self) -> Arc<LeafClassifier> {
        Arc::clone(&self.classifier)
    }

    /// 获取配置引用
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 模型健康检查
    pub fn health_check(&self) -> Result<()> {
        tracing::debug!("Performing model health check...");

        if !self.config.model_path().exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Model artifact missing: {}",
                self.config.model_path().display()
            )));
        }

        tracing::debug!("Model health check passed");
        Ok(())
    }

    /// 获取模型统计信息
    pub fn get_stats(&self) -> ModelStats {
        ModelStats {
            model_loaded: true,
            architecture: "MobileNetV2".to_string(),
            input_size: [
                crate::image::preprocessing::INPUT_WIDTH,
                crate::image::preprocessing::INPUT_HEIGHT,
            ],
            num_classes: crate::classify::labels::NUM_CLASSES,
            intra_threads: self.config.onnx_config.intra_threads,
            optimization_level: self.config.onnx_config.optimization_level,
        }
    }
}

/// 模型统计信息
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStats {
    pub model_loaded: bool,
    pub architecture: String,
    pub input_size: [u32; 2],
    pub num_classes: usize,
    pub intra_threads: usize,
    pub optimization_level: i32,
}

/// 便捷函数：获取分类器
pub fn get_classifier() -> Result<Arc<LeafClassifier>> {
    let manager = ModelManager::instance()?;
    Ok(manager.classifier())
}

/// 便捷函数：检查模型健康状态
pub fn health_check() -> Result<()> {
    let manager = ModelManager::instance()?;
    manager.health_check()
}

/// 便捷函数：获取模型统计信息
pub fn get_model_stats() -> Result<ModelStats> {
    let manager = ModelManager::instance()?;
    Ok(manager.get_stats())
}
