//! Classifier families that can be exported into a model artifact.
//!
//! The artifact is a JSON object tagged by `kind`. Decoding produces a
//! [`ModelArtifact`], which is checked structurally and turned into a boxed
//! [`Classifier`] by [`ModelArtifact::into_classifier`].

use crate::domain::model::FeatureVector;
use crate::domain::ports::Classifier;
use crate::utils::error::{Result, ShimError};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearArtifact),
    DecisionTree(DecisionTreeArtifact),
    RandomForest(RandomForestArtifact),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub classes: Vec<f64>,
    /// One row per decision function, one column per feature.
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeArtifact {
    pub classes: Vec<f64>,
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestArtifact {
    pub classes: Vec<f64>,
    pub n_features: usize,
    pub trees: Vec<TreeArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class weights, same order as `classes`.
        value: Vec<f64>,
    },
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Linear(_) => "linear",
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    /// Validate the artifact's structure and build the runtime model.
    ///
    /// The error string describes the first structural problem found.
    pub fn into_classifier(self) -> std::result::Result<Box<dyn Classifier>, String> {
        match self {
            ModelArtifact::Linear(artifact) => Ok(Box::new(LinearClassifier::try_from(artifact)?)),
            ModelArtifact::DecisionTree(artifact) => {
                check_classes(&artifact.classes, 1)?;
                let tree = Tree::build(artifact.nodes, artifact.n_features, artifact.classes.len())?;
                Ok(Box::new(DecisionTreeClassifier {
                    classes: artifact.classes,
                    n_features: artifact.n_features,
                    tree,
                }))
            }
            ModelArtifact::RandomForest(artifact) => {
                check_classes(&artifact.classes, 1)?;
                if artifact.trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                let trees = artifact
                    .trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| {
                        Tree::build(t.nodes, artifact.n_features, artifact.classes.len())
                            .map_err(|e| format!("tree {}: {}", i, e))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Box::new(RandomForestClassifier {
                    classes: artifact.classes,
                    n_features: artifact.n_features,
                    trees,
                }))
            }
        }
    }
}

fn check_classes(classes: &[f64], min: usize) -> std::result::Result<(), String> {
    if classes.len() < min {
        return Err(format!(
            "model must declare at least {} class(es), found {}",
            min,
            classes.len()
        ));
    }
    if let Some(bad) = classes.iter().find(|c| !c.is_finite()) {
        return Err(format!("class label {} is not a finite number", bad));
    }
    Ok(())
}

fn check_width(sample: &FeatureVector, expected: usize, name: &str) -> Result<()> {
    if sample.width() != expected {
        return Err(ShimError::model(format!(
            "X has {} features, but {} is expecting {} features as input.",
            sample.width(),
            name,
            expected
        )));
    }
    Ok(())
}

/// Index of the first maximum, matching numpy's `argmax` tie-breaking.
fn argmax<I: IntoIterator<Item = f64>>(values: I) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.into_iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Linear decision functions: logistic regression, linear SVM and friends.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    classes: Vec<f64>,
    weights: Array2<f64>,
    intercepts: Array1<f64>,
}

impl TryFrom<LinearArtifact> for LinearClassifier {
    type Error = String;

    fn try_from(artifact: LinearArtifact) -> std::result::Result<Self, Self::Error> {
        check_classes(&artifact.classes, 2)?;

        let rows = artifact.coefficients.len();
        let expected_rows = if artifact.classes.len() == 2 { 1 } else { artifact.classes.len() };
        // binary exports may also carry one row per class
        if rows != expected_rows && rows != artifact.classes.len() {
            return Err(format!(
                "expected {} coefficient row(s) for {} classes, found {}",
                expected_rows,
                artifact.classes.len(),
                rows
            ));
        }
        if artifact.intercepts.len() != rows {
            return Err(format!(
                "expected {} intercept(s), found {}",
                rows,
                artifact.intercepts.len()
            ));
        }

        let n_features = artifact.coefficients[0].len();
        if let Some((i, row)) = artifact
            .coefficients
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(format!(
                "coefficient row {} has {} values, expected {}",
                i,
                row.len(),
                n_features
            ));
        }

        let flat: Vec<f64> = artifact.coefficients.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((rows, n_features), flat).map_err(|e| e.to_string())?;

        Ok(Self {
            classes: artifact.classes,
            weights,
            intercepts: Array1::from_vec(artifact.intercepts),
        })
    }
}

impl Classifier for LinearClassifier {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    fn predict(&self, sample: &FeatureVector) -> Result<f64> {
        check_width(sample, self.n_features(), "LinearClassifier")?;

        let scores = self.weights.dot(&sample.row()) + &self.intercepts;
        let index = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(scores.iter().copied())
        };
        Ok(self.classes[index])
    }
}

/// Array-encoded binary tree. Node 0 is the root and every child index is
/// greater than its parent's, so traversal always terminates.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    fn build(
        nodes: Vec<TreeNode>,
        n_features: usize,
        n_classes: usize,
    ) -> std::result::Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but the model has {} features",
                            i, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= nodes.len() {
                            return Err(format!("node {} has invalid child index {}", i, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} class weights, expected {}",
                            i,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite weight", i));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {} has no class weight", i));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    fn leaf(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    classes: Vec<f64>,
    n_features: usize,
    tree: Tree,
}

impl Classifier for DecisionTreeClassifier {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, sample: &FeatureVector) -> Result<f64> {
        check_width(sample, self.n_features, "DecisionTreeClassifier")?;
        let leaf = self.tree.leaf(sample.row());
        Ok(self.classes[argmax(leaf.iter().copied())])
    }
}

/// Soft-voting ensemble: per-tree class probabilities are averaged.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    classes: Vec<f64>,
    n_features: usize,
    trees: Vec<Tree>,
}

impl Classifier for RandomForestClassifier {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, sample: &FeatureVector) -> Result<f64> {
        check_width(sample, self.n_features, "RandomForestClassifier")?;

        let row = sample.row();
        let mut proba = Array1::<f64>::zeros(self.classes.len());
        for tree in &self.trees {
            let leaf = ArrayView1::from(tree.leaf(row.view()));
            proba += &(&leaf / leaf.sum());
        }
        proba /= self.trees.len() as f64;

        Ok(self.classes[argmax(proba.iter().copied())])
    }
}
