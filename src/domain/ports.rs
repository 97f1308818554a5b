use crate::domain::model::FeatureVector;
use crate::utils::error::Result;

/// A loaded, immutable model. Implementations must be safe to share across
/// request handlers without locking.
pub trait Classifier: Send + Sync {
    /// Short identifier of the model family, e.g. `"linear"`.
    fn kind(&self) -> &'static str;

    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Predict the class label for exactly one sample.
    fn predict(&self, sample: &FeatureVector) -> Result<f64>;
}

pub trait ArtifactStore: Send + Sync {
    fn read_artifact(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn artifact_dir(&self) -> &str;
    fn model_file(&self) -> &str;
    fn columns_file(&self) -> &str;
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn verbose(&self) -> bool;
    fn json_logs(&self) -> bool;
    fn monitor(&self) -> bool;
}
