use crate::core::classifier::ModelArtifact;
use crate::domain::model::FeatureSchema;
use crate::domain::ports::{ArtifactStore, Classifier};
use crate::utils::error::{Result, ShimError};
use std::sync::Arc;

/// Model and schema, loaded once before serving.
pub struct LoadedArtifacts {
    pub schema: FeatureSchema,
    pub model: Arc<dyn Classifier>,
}

pub async fn load_schema<S: ArtifactStore>(store: &S, path: &str) -> Result<FeatureSchema> {
    let bytes = store.read_artifact(path).await?;
    let schema: FeatureSchema = serde_json::from_slice(&bytes)
        .map_err(|e| ShimError::artifact(path, format!("expected a JSON array of feature names: {}", e)))?;

    tracing::debug!("Feature schema: {:?}", schema.names());
    Ok(schema)
}

pub async fn load_model<S: ArtifactStore>(store: &S, path: &str) -> Result<Arc<dyn Classifier>> {
    let bytes = store.read_artifact(path).await?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)
        .map_err(|e| ShimError::artifact(path, format!("invalid model document: {}", e)))?;

    let kind = artifact.kind();
    let model = artifact
        .into_classifier()
        .map_err(|e| ShimError::artifact(path, format!("invalid {} model: {}", kind, e)))?;

    Ok(Arc::from(model))
}

/// Load both artifacts. Either failing aborts the whole load.
pub async fn load_artifacts<S: ArtifactStore>(
    store: &S,
    model_path: &str,
    columns_path: &str,
) -> Result<LoadedArtifacts> {
    let model = load_model(store, model_path).await?;
    tracing::info!(
        "✓ Model loaded: {} ({} input features)",
        model.kind(),
        model.n_features()
    );

    let schema = load_schema(store, columns_path).await?;
    tracing::info!("✓ Feature schema loaded: {} columns", schema.len());

    if schema.len() != model.n_features() {
        // not fatal: every request will be rejected by the model instead
        tracing::warn!(
            "Feature schema has {} columns but the model expects {}",
            schema.len(),
            model.n_features()
        );
    }

    Ok(LoadedArtifacts { schema, model })
}
