pub mod alignment;
pub mod artifacts;
pub mod classifier;
pub mod engine;

pub use crate::domain::model::{FeatureSchema, FeatureVector, Payload, Prediction};
pub use crate::domain::ports::{ArtifactStore, Classifier, ConfigProvider};
pub use crate::utils::error::Result;
