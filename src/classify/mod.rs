pub mod labels;
pub mod pipeline;
pub mod types;

pub use labels::{top_class, ClassInfo, CLASSES, NUM_CLASSES};
pub use pipeline::ClassifyPipeline;
pub use types::{ClassProbability, ClassifyStage, ClassifyStatus, ModelInfo, Prediction};
