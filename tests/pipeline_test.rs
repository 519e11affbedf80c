use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use timbre_features::analysis::silence::{trim, Threshold};
use timbre_features::batch::discover;
use timbre_features::error::{AnalysisError, ExtractError};
use timbre_features::{AppConfig, BatchExtractor, FeatureExtractor, FeatureLayout, FeatureTable};

const SAMPLE_RATE: u32 = 22_050;

fn write_wav(path: &Path, samples: &[f32]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer
            .write_sample((sample * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn tone(frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

fn noise(amplitude: f32, len: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.gen_range(-amplitude..amplitude)).collect()
}

/// data/<class>/<file>.wav with a silent file mixed in
fn build_corpus(root: &Path) -> Vec<PathBuf> {
    let mut padded = vec![0.0f32; 2_000];
    padded.extend(tone(220.0, 0.5, 11_025));
    padded.extend(vec![0.0f32; 2_000]);

    let files = vec![
        (root.join("cello/low.wav"), padded),
        (root.join("cello/high.wav"), tone(440.0, 0.3, 8_000)),
        (root.join("hat/open.wav"), noise(0.4, 6_000)),
        (root.join("hat/silent.wav"), vec![0.0f32; 4_000]),
    ];
    for (path, samples) in &files {
        write_wav(path, samples);
    }
    files.into_iter().map(|(path, _)| path).collect()
}

#[test]
fn test_trim_scenario() {
    let mut samples = vec![0.0f32; 1000];
    samples.extend(vec![0.5f32; 1000]);
    samples.extend(vec![0.0f32; 1000]);

    let trimmed = trim(&samples, Threshold::DEFAULT, Threshold::DEFAULT);
    assert_eq!(trimmed.len(), 1002);
    assert_eq!(trimmed, &samples[999..2001]);
}

#[test]
fn test_extract_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let paths = build_corpus(dir.path());

    let extractor = FeatureExtractor::new(&AppConfig::default()).unwrap();
    let features = extractor.extract_file(&paths[0]).unwrap();

    // Silence padding is trimmed away before duration is measured
    let duration = features.get("duration").unwrap();
    assert!((duration - 0.5).abs() < 0.01, "duration {}", duration);
    assert_eq!(features.len(), 1 + 10 * (3 + 99));
    assert!(features.iter().all(|(_, value)| value.is_finite()));
}

#[test]
fn test_batch_isolates_silent_file() {
    let dir = tempfile::tempdir().unwrap();
    build_corpus(dir.path());

    let extractor = FeatureExtractor::new(&AppConfig::default()).unwrap();
    let report = BatchExtractor::new(extractor).run(dir.path()).unwrap();

    assert_eq!(report.processed(), 4);
    assert_eq!(report.features.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("hat/silent.wav"));
    assert_eq!(
        report.failures[0].error,
        ExtractError::Analysis(AnalysisError::SilentSignal)
    );
    assert!(report
        .features
        .keys()
        .all(|path| !path.ends_with("silent.wav")));
}

#[test]
fn test_dataset_from_batch() {
    let dir = tempfile::tempdir().unwrap();
    build_corpus(dir.path());

    let mut config = AppConfig::default();
    config.extraction.layout = FeatureLayout::Summary;
    config.extraction.band_count = 12;
    let extractor = FeatureExtractor::new(&config).unwrap();
    let report = BatchExtractor::new(extractor).run(dir.path()).unwrap();

    let table = FeatureTable::from_features(&report.features).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.class_names, vec!["cello", "hat"]);
    assert_eq!(table.feature_names.len(), 6 + 12);
    assert!(table.rows.iter().all(|row| row.len() == 18));

    let counts = table.class_counts();
    assert_eq!(counts["cello"], 2);
    assert_eq!(counts["hat"], 1);
}

#[test]
fn test_discover_lists_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let mut expected = build_corpus(dir.path());
    expected.sort();
    assert_eq!(discover(dir.path()).unwrap(), expected);
}
