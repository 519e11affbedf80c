// Types module - feature vector and layout versions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named scalar features for one audio file
///
/// Keys are unique and iterate (and serialize) in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f32>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a feature, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: f32) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, f32)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Versioned feature field sets
///
/// - `Summary`: `duration`, `start_loudness`, `mid_loudness`, `end_loudness`,
///   `fundamental_freq`, `fundamental_deviation`, `average_eq_<band>`
/// - `Windowed`: `duration`, `loudness_<i>`, `fundamental_in_hertz`,
///   `fundamental_stddev`, `average_eq_<i>_<band>`
/// - `Sectioned`: `duration`, then per section `loudness_<i>`,
///   `fundamental_<i>`, `fundamental_stddev_<i>`, `average_eq_<i>_<band>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayout {
    Summary,
    Windowed,
    #[default]
    Sectioned,
}
