//! Batch extraction over a directory of audio files.
//!
//! Files are processed one at a time and independently: a file that fails to
//! decode or analyze is logged, recorded in the report and left out of the
//! feature map, and the run continues with the next file.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::features::{FeatureExtractor, FeatureVector};
use crate::error::{log_extract_error, ExtractError};

/// Feature vectors keyed by file path, in sorted order
pub type FeatureMap = BTreeMap<String, FeatureVector>;

/// A file whose extraction failed
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ExtractError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub features: FeatureMap,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.features.len() + self.failures.len()
    }
}

/// Runs a [`FeatureExtractor`] over many files with per-file isolation
pub struct BatchExtractor {
    extractor: FeatureExtractor,
}

impl BatchExtractor {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Discover every file under `root` and extract it
    pub fn run(&self, root: &Path) -> io::Result<BatchReport> {
        let paths = discover(root)?;
        info!(root = %root.display(), files = paths.len(), "Discovered audio files");
        Ok(self.extract_paths(&paths))
    }

    /// Extract the given files, isolating failures
    pub fn extract_paths(&self, paths: &[PathBuf]) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport::default();

        for path in paths {
            match self.extractor.extract_file(path) {
                Ok(features) => {
                    debug!(path = %path.display(), features = features.len(), "Extracted");
                    report
                        .features
                        .insert(path.to_string_lossy().into_owned(), features);
                }
                Err(error) => {
                    log_extract_error(path, &error);
                    report.failures.push(FileFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            extracted = report.features.len(),
            failed = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch extraction finished"
        );
        report
    }
}

/// List files below the class folders of `root`, sorted, skipping dot-files
///
/// Files directly in `root` have no class folder and are skipped. Symlinks
/// are followed; a directory reached twice is only walked once. A missing
/// root yields an empty list.
pub fn discover(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }

    let mut visited = HashSet::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        if !visited.insert(fs::canonicalize(&dir)?) {
            continue;
        }

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };

            if metadata.is_dir() {
                pending.push(path);
            } else if metadata.is_file() && dir != root {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Write JSON with 4-space indentation and sorted keys
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> serde_json::Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)
}

/// [`write_json`] into a `String`
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    write_json(&mut buffer, value)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_discover_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("violin")).unwrap();
        fs::create_dir_all(dir.path().join("cello/nested")).unwrap();
        fs::write(dir.path().join("violin/b.wav"), b"").unwrap();
        fs::write(dir.path().join("violin/a.wav"), b"").unwrap();
        fs::write(dir.path().join("cello/nested/c.wav"), b"").unwrap();
        fs::write(dir.path().join("violin/.DS_Store"), b"").unwrap();
        fs::write(dir.path().join("loose.wav"), b"").unwrap();

        let files = discover(dir.path()).unwrap();
        let relative: Vec<PathBuf> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("cello/nested/c.wav"),
                PathBuf::from("violin/a.wav"),
                PathBuf::from("violin/b.wav"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let samples = tempfile::tempdir().unwrap();
        fs::create_dir_all(samples.path().join("kick")).unwrap();
        fs::write(samples.path().join("kick/a.wav"), b"").unwrap();
        fs::write(samples.path().join("b.wav"), b"").unwrap();

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("snare")).unwrap();
        symlink(samples.path().join("kick"), dir.path().join("kick")).unwrap();
        symlink(samples.path().join("b.wav"), dir.path().join("snare/b.wav")).unwrap();
        // Cycle back to the root
        symlink(dir.path(), dir.path().join("snare/loop")).unwrap();
        symlink(samples.path().join("gone.wav"), dir.path().join("snare/gone.wav")).unwrap();

        let files = discover(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("kick/a.wav"), dir.path().join("snare/b.wav")]
        );
    }

    #[test]
    fn test_discover_missing_root() {
        assert!(discover(Path::new("/nonexistent/data")).unwrap().is_empty());
    }

    #[test]
    fn test_undecodable_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let junk = dir.path().join("junk.wav");
        fs::write(&junk, b"definitely not audio").unwrap();

        let extractor = FeatureExtractor::new(&AppConfig::default()).unwrap();
        let report = BatchExtractor::new(extractor).extract_paths(&[junk.clone()]);
        assert!(report.features.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, junk);
        assert!(matches!(report.failures[0].error, ExtractError::Decode(_)));
        assert_eq!(report.processed(), 1);
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let mut map = FeatureMap::new();
        let mut features = FeatureVector::new();
        features.insert("duration", 0.5);
        map.insert("data/a.wav".to_string(), features);

        let json = to_json_string(&map).unwrap();
        assert_eq!(json, "{\n    \"data/a.wav\": {\n        \"duration\": 0.5\n    }\n}");
    }
}
