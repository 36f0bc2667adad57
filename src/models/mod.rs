pub mod classifier;
pub mod manager;

pub use classifier::LeafClassifier;
pub use manager::{ModelManager, ModelStats};

// Re-export convenience functions from manager
pub use manager::{get_classifier, get_model_stats, health_check};
