use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Ordered feature names the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parsed request body: feature name to raw JSON value, any shape.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// One sample, shape `(1, n_features)`, aligned to a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array2<f64>,
}

impl FeatureVector {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values: Array1::from_vec(values).insert_axis(Axis(0)),
        }
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row(&self) -> ArrayView1<'_, f64> {
        self.values.index_axis(Axis(0), 0)
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.row().to_vec()
    }
}

/// Successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_is_single_row() {
        let vector = FeatureVector::from_values(vec![30.0, 50000.0]);
        assert_eq!(vector.as_array().shape(), &[1, 2]);
        assert_eq!(vector.to_vec(), vec![30.0, 50000.0]);
    }

    #[test]
    fn empty_vector_keeps_one_row() {
        let vector = FeatureVector::from_values(vec![]);
        assert_eq!(vector.as_array().shape(), &[1, 0]);
        assert_eq!(vector.width(), 0);
    }

    #[test]
    fn schema_deserializes_from_plain_array() {
        let schema: FeatureSchema = serde_json::from_str(r#"["age", "income"]"#).unwrap();
        assert_eq!(schema.names(), &["age".to_string(), "income".to_string()]);
    }
}
