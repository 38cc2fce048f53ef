//! Partitioning a corpus into groups of similarly shaped paths.
//!
//! Every strategy returns one group id per path, in corpus order. Ids are
//! dense and numbered by first appearance, so group `0` always holds the
//! first path.

use crate::features::PathFeatures;
use crate::vectorize::FeatureSpace;
use ndarray::Array2;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A way of assigning corpus paths to groups
pub trait GroupingStrategy {
    fn name(&self) -> &'static str;

    /// Group ids per path, or `None` when the strategy cannot handle this corpus
    fn group(&self, features: &PathFeatures, clusters: usize) -> Option<Vec<usize>>;
}

/// Agglomerative clustering with Ward's minimum-variance criterion.
///
/// Starts from singletons over the feature vectors and repeatedly merges the
/// pair of groups whose union least increases within-group variance, using
/// Lance-Williams updates on squared Euclidean distances. Ties merge the
/// lowest-indexed pair first.
#[derive(Debug, Clone)]
pub struct WardLinkage {
    top_literals: usize,
    depth_scale: f64,
}

impl WardLinkage {
    #[must_use]
    pub const fn new(top_literals: usize, depth_scale: f64) -> Self {
        Self {
            top_literals,
            depth_scale,
        }
    }
}

impl GroupingStrategy for WardLinkage {
    fn name(&self) -> &'static str {
        "ward"
    }

    fn group(&self, features: &PathFeatures, clusters: usize) -> Option<Vec<usize>> {
        if features.len() < 2 || clusters == 0 {
            return None;
        }
        let space = FeatureSpace::from_features(features, self.top_literals, self.depth_scale);
        let vectors = space.matrix(features);
        Some(ward_labels(&vectors, clusters))
    }
}

fn squared_distances(vectors: &Array2<f64>) -> Array2<f64> {
    let n = vectors.nrows();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| {
                    let diff = &vectors.row(i) - &vectors.row(j);
                    diff.dot(&diff)
                })
                .collect()
        })
        .collect();

    let mut distances = Array2::zeros((n, n));
    for (i, row) in rows.into_iter().enumerate() {
        for (j, d) in row.into_iter().enumerate() {
            distances[[i, j]] = d;
        }
    }
    distances
}

fn ward_labels(vectors: &Array2<f64>, clusters: usize) -> Vec<usize> {
    let n = vectors.nrows();
    let mut distances = squared_distances(vectors);
    let mut sizes = vec![1usize; n];
    let mut active = vec![true; n];
    let mut owner: Vec<usize> = (0..n).collect();
    let mut remaining = n;

    while remaining > clusters.max(1) {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in (0..n).filter(|&a| active[a]) {
            for b in (a + 1..n).filter(|&b| active[b]) {
                let d = distances[[a, b]];
                if best.map_or(true, |(_, _, current)| d < current) {
                    best = Some((a, b, d));
                }
            }
        }
        let Some((a, b, d_ab)) = best else {
            break;
        };

        let (size_a, size_b) = (sizes[a] as f64, sizes[b] as f64);
        for m in (0..n).filter(|&m| active[m] && m != a && m != b) {
            let size_m = sizes[m] as f64;
            let updated = ((size_a + size_m) * distances[[a, m]]
                + (size_b + size_m) * distances[[b, m]]
                - size_m * d_ab)
                / (size_a + size_b + size_m);
            distances[[a, m]] = updated;
            distances[[m, a]] = updated;
        }

        sizes[a] += sizes[b];
        active[b] = false;
        for slot in owner.iter_mut().filter(|slot| **slot == b) {
            *slot = a;
        }
        remaining -= 1;
    }

    renumber(&owner)
}

/// Fallback grouping by the value of the most value-diverse key.
///
/// Values are hashed into a fixed number of buckets with SHA-256, so the
/// assignment is stable across runs and platforms. Paths lacking the key
/// share one extra bucket. Without any keys, paths group by depth.
#[derive(Debug, Clone)]
pub struct ValueBuckets {
    buckets: usize,
}

impl ValueBuckets {
    #[must_use]
    pub const fn new(buckets: usize) -> Self {
        Self { buckets }
    }

    #[must_use]
    pub fn assign(&self, features: &PathFeatures) -> Vec<usize> {
        let buckets = self.buckets.max(1);
        let raw: Vec<usize> = match features.most_diverse_key() {
            Some(key) => {
                log::debug!("Bucketing {} paths by '{key}'", features.len());
                features
                    .paths()
                    .iter()
                    .map(|path| match path.value_of(key) {
                        Some(value) => bucket_of(value, buckets),
                        None => buckets,
                    })
                    .collect()
            }
            None => {
                log::debug!("No key=value segments, grouping {} paths by depth", features.len());
                features.depths().collect()
            }
        };
        renumber(&raw)
    }
}

impl GroupingStrategy for ValueBuckets {
    fn name(&self) -> &'static str {
        "value-buckets"
    }

    fn group(&self, features: &PathFeatures, _clusters: usize) -> Option<Vec<usize>> {
        Some(self.assign(features))
    }
}

fn bucket_of(value: &str, buckets: usize) -> usize {
    let digest = Sha256::digest(value.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % buckets as u64) as usize
}

/// Map arbitrary ids to `0..k` by first appearance
fn renumber(raw: &[usize]) -> Vec<usize> {
    let mut ids = HashMap::new();
    raw.iter()
        .map(|id| {
            let next = ids.len();
            *ids.entry(*id).or_insert(next)
        })
        .collect()
}
