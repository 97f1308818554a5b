use crate::core::alignment;
use crate::core::artifacts::LoadedArtifacts;
use crate::domain::model::{FeatureSchema, FeatureVector, Payload, Prediction};
use crate::domain::ports::Classifier;
use crate::utils::error::{Result, ShimError};
use std::sync::Arc;

/// Immutable serving state: the schema and the model it feeds.
///
/// Cheap to clone; clones share the same model.
#[derive(Clone)]
pub struct InferenceEngine {
    schema: Arc<FeatureSchema>,
    model: Arc<dyn Classifier>,
}

impl InferenceEngine {
    pub fn new(schema: FeatureSchema, model: Arc<dyn Classifier>) -> Self {
        Self {
            schema: Arc::new(schema),
            model,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn align(&self, payload: &Payload) -> Result<FeatureVector> {
        alignment::align(&self.schema, payload)
    }

    /// Full request path: parse, align, predict, coerce the label.
    pub fn predict_body(&self, body: &[u8]) -> Result<Prediction> {
        let payload = alignment::parse_payload(body)?;
        self.predict(&payload)
    }

    pub fn predict(&self, payload: &Payload) -> Result<Prediction> {
        let sample = self.align(payload)?;
        let label = self.model.predict(&sample)?;
        Ok(Prediction {
            prediction: label_to_int(label)?,
        })
    }
}

impl From<LoadedArtifacts> for InferenceEngine {
    fn from(loaded: LoadedArtifacts) -> Self {
        Self::new(loaded.schema, loaded.model)
    }
}

/// Truncates toward zero; NaN, infinities and out-of-range labels fail.
fn label_to_int(label: f64) -> Result<i64> {
    if !label.is_finite() {
        return Err(ShimError::model(format!("cannot convert float {} to integer", label)));
    }
    let truncated = label.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(ShimError::model(format!("label {} does not fit in a 64-bit integer", label)));
    }
    Ok(truncated as i64)
}
