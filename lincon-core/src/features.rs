//! Sparse lists of active features.
use serde::{Deserialize, Serialize};

/// How [`FeatureList::add`] treats an index that is already in the list.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum DuplicateMode {
    /// Factors of the same index are summed.
    Merge,

    /// The new factor replaces the old one.
    Replace,

    /// Every addition is kept as a separate entry.
    Allow,
}

/// An active feature: an index in the feature space and its activation factor.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Feature {
    /// Index in the feature space.
    pub index: usize,
    /// Activation.
    pub factor: f64,
}

/// A sparse vector of [`Feature`]s.
///
/// Lists are used as scratch buffers, cleared and refilled on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureList {
    features: Vec<Feature>,
    mode: DuplicateMode,
}

impl Default for FeatureList {
    fn default() -> Self {
        Self::new(DuplicateMode::Merge)
    }
}

impl FeatureList {
    /// Creates an empty list.
    pub fn new(mode: DuplicateMode) -> Self {
        Self {
            features: Vec::new(),
            mode,
        }
    }

    /// Creates a list from `(index, factor)` pairs, added in order.
    pub fn from_pairs(mode: DuplicateMode, pairs: &[(usize, f64)]) -> Self {
        let mut list = Self::new(mode);
        for &(index, factor) in pairs {
            list.add(index, factor);
        }
        list
    }

    /// Duplicate handling of this list.
    pub fn mode(&self) -> DuplicateMode {
        self.mode
    }

    /// Removes all features.
    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if there is no entry.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// The `i`-th entry.
    pub fn get(&self, i: usize) -> Feature {
        self.features[i]
    }

    /// Adds a feature according to the duplicate mode of the list.
    pub fn add(&mut self, index: usize, factor: f64) {
        if self.mode != DuplicateMode::Allow {
            if let Some(f) = self.features.iter_mut().find(|f| f.index == index) {
                match self.mode {
                    DuplicateMode::Merge => f.factor += factor,
                    _ => f.factor = factor,
                }
                return;
            }
        }
        self.features.push(Feature { index, factor });
    }

    /// Sum of the factors of all entries with the given index.
    pub fn get_factor(&self, index: usize) -> f64 {
        self.features
            .iter()
            .filter(|f| f.index == index)
            .map(|f| f.factor)
            .sum()
    }

    /// Multiplies every factor by `factor`.
    pub fn mult(&mut self, factor: f64) {
        self.features.iter_mut().for_each(|f| f.factor *= factor);
    }

    /// Sparse inner product with another list.
    pub fn inner_product(&self, other: &FeatureList) -> f64 {
        self.features
            .iter()
            .map(|f| f.factor * other.get_factor(f.index))
            .sum()
    }

    /// Adds every entry of `other`, scaled by `factor`.
    pub fn add_feature_list(&mut self, other: &FeatureList, factor: f64) {
        for f in other.iter() {
            self.add(f.index, f.factor * factor);
        }
    }

    /// Replaces the entries with a copy of those in `other`, keeping this list's mode.
    pub fn copy_from(&mut self, other: &FeatureList) {
        self.features.clear();
        self.features.extend_from_slice(&other.features);
    }

    /// Combines this list with `other` as an outer product.
    ///
    /// Each pair of entries `(i, j)` yields index `i.index + j.index * offset` and
    /// factor `i.factor * j.factor`. `offset` must be the size of this list's index
    /// space so that the combined indices do not collide.
    pub fn spawn(&mut self, other: &FeatureList, offset: usize) {
        let current = std::mem::take(&mut self.features);
        for j in other.iter() {
            for i in current.iter() {
                self.add(i.index + j.index * offset, i.factor * j.factor);
            }
        }
    }

    /// Adds `offset` to every index.
    pub fn offset_indices(&mut self, offset: usize) {
        self.features.iter_mut().for_each(|f| f.index += offset);
    }

    /// Removes entries whose factor is below `threshold`.
    pub fn apply_threshold(&mut self, threshold: f64) {
        self.features.retain(|f| f.factor >= threshold);
    }

    /// Scales the factors so that they sum to 1. Lists summing to 0 are left untouched.
    pub fn normalize(&mut self) {
        let sum: f64 = self.features.iter().map(|f| f.factor).sum();
        if sum != 0.0 {
            self.mult(1.0 / sum);
        }
    }

    /// Index of the entry with the largest factor, `None` if the list is empty.
    pub fn max_factor_index(&self) -> Option<usize> {
        let mut best: Option<Feature> = None;
        for f in self.features.iter() {
            match best {
                Some(b) if b.factor >= f.factor => {}
                _ => best = Some(*f),
            }
        }
        best.map(|f| f.index)
    }
}

impl<'a> IntoIterator for &'a FeatureList {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
