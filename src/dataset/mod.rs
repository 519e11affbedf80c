//! Dataset assembly from extracted feature maps.
//!
//! Turns a `path -> features` map into aligned numeric rows for a classifier:
//! - feature columns are the sorted keys of the first sample
//! - the class of a sample is the name of its parent folder
//! - values are clamped to ±1 000 000 so downstream learners never see
//!   infinities

mod cache;

pub use cache::{DatasetCache, Memo};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::batch::FeatureMap;
use crate::error::DatasetError;

/// Largest magnitude kept in a feature row
pub const VALUE_LIMIT: f32 = 1_000_000.0;

/// Aligned feature rows with class labels
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub feature_names: Vec<String>,
    /// Sorted, unique class names
    pub class_names: Vec<String>,
    /// File name of each row
    pub sample_names: Vec<String>,
    /// Index into `class_names` for each row
    pub classes: Vec<usize>,
    pub rows: Vec<Vec<f32>>,
}

impl FeatureTable {
    /// Align a feature map into a table
    ///
    /// # Errors
    /// - `Empty` for an empty map
    /// - `MissingClass` when a path has no parent folder
    /// - `MissingFeature` when a sample lacks one of the reference keys
    pub fn from_features(features: &FeatureMap) -> Result<Self, DatasetError> {
        let (_, first) = features.iter().next().ok_or(DatasetError::Empty)?;
        let feature_names: Vec<String> = first.names().map(str::to_string).collect();

        let mut labelled = Vec::with_capacity(features.len());
        for path in features.keys() {
            labelled.push((path, class_of(path)?));
        }

        let mut class_names: Vec<String> = labelled.iter().map(|(_, class)| class.clone()).collect();
        class_names.sort();
        class_names.dedup();

        let mut table = FeatureTable {
            feature_names,
            class_names,
            sample_names: Vec::with_capacity(features.len()),
            classes: Vec::with_capacity(features.len()),
            rows: Vec::with_capacity(features.len()),
        };

        for ((path, class), vector) in labelled.into_iter().zip(features.values()) {
            let row = table
                .feature_names
                .iter()
                .map(|name| {
                    vector
                        .get(name)
                        .map(|value| value.clamp(-VALUE_LIMIT, VALUE_LIMIT))
                        .ok_or_else(|| DatasetError::MissingFeature {
                            sample: path.clone(),
                            feature: name.clone(),
                        })
                })
                .collect::<Result<Vec<f32>, _>>()?;

            let class_index = table
                .class_names
                .binary_search(&class)
                .map_err(|_| DatasetError::MissingClass {
                    sample: path.clone(),
                })?;

            table.sample_names.push(sample_name(path));
            table.classes.push(class_index);
            table.rows.push(row);
        }

        Ok(table)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let features: FeatureMap = serde_json::from_str(json)?;
        Self::from_features(&features)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let features: FeatureMap = serde_json::from_reader(reader)?;
        Self::from_features(&features)
    }

    /// Read a feature JSON file written by the batch extractor
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|err| DatasetError::Io {
            reason: format!("{}: {}", path.display(), err),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of samples per class name
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = self
            .class_names
            .iter()
            .map(|name| (name.clone(), 0))
            .collect();
        for &class in &self.classes {
            if let Some(count) = counts.get_mut(&self.class_names[class]) {
                *count += 1;
            }
        }
        counts
    }
}

fn class_of(path: &str) -> Result<String, DatasetError> {
    Path::new(path)
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DatasetError::MissingClass {
            sample: path.to_string(),
        })
}

fn sample_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
