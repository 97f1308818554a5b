pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::{router, AppState};
pub use adapters::storage::LocalArtifactStore;
pub use config::{toml_config::TomlConfig, CliConfig};
pub use core::engine::InferenceEngine;
pub use domain::model::{FeatureSchema, FeatureVector, Prediction};
pub use utils::error::{Result, ShimError};
