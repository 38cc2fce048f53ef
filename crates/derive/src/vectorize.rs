use crate::features::{ParsedPath, PathFeatures};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

/// Dimensions of the per-path feature vectors.
///
/// Layout: one presence dimension per discovered key (sorted), one presence
/// dimension per frequent literal segment, then normalized depth.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpace {
    keys: Vec<String>,
    literals: Vec<String>,
    depth_scale: f64,
}

impl FeatureSpace {
    #[must_use]
    pub fn from_features(features: &PathFeatures, top_literals: usize, depth_scale: f64) -> Self {
        Self {
            keys: features.keys().map(str::to_string).collect(),
            literals: features
                .frequent_literals(top_literals)
                .into_iter()
                .map(str::to_string)
                .collect(),
            depth_scale,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.keys.len() + self.literals.len() + 1
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[must_use]
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    #[must_use]
    pub fn vector(&self, path: &ParsedPath) -> Vec<f64> {
        let mut vector = Vec::with_capacity(self.dimensions());
        vector.extend(self.keys.iter().map(|key| presence(path.has_key(key))));
        vector.extend(
            self.literals
                .iter()
                .map(|literal| presence(path.has_literal(literal))),
        );
        vector.push(path.depth() as f64 / self.depth_scale);
        vector
    }

    /// One row per path, in corpus order
    #[must_use]
    pub fn matrix(&self, features: &PathFeatures) -> Array2<f64> {
        let rows: Vec<Vec<f64>> = features
            .paths()
            .par_iter()
            .map(|path| self.vector(path))
            .collect();

        let mut matrix = Array2::zeros((rows.len(), self.dimensions()));
        for (mut target, row) in matrix.rows_mut().into_iter().zip(&rows) {
            target.assign(&ArrayView1::from(row.as_slice()));
        }
        matrix
    }
}

fn presence(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}
