use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_feature_extract"))
}

fn write_tone(path: &Path, frequency: f32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..8_000 {
        let t = i as f32 / 22_050.0;
        let sample = 0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin();
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn extract_then_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write_tone(&data.join("kick/a.wav"), 80.0);
    write_tone(&data.join("snare/b.wav"), 300.0);
    let features_path = dir.path().join("features.json");

    let output = cli()
        .arg("extract")
        .arg(&data)
        .arg("--output")
        .arg(&features_path)
        .output()
        .expect("extract command");
    assert!(
        output.status.success(),
        "extract exited with {:?}",
        output.status.code()
    );

    let written = fs::read_to_string(&features_path).expect("features written to disk");
    assert!(written.starts_with("{\n    \""), "expected 4-space indent");
    let json: Value = serde_json::from_str(&written).expect("valid JSON payload");
    let map = json.as_object().unwrap();
    assert_eq!(map.len(), 2);
    let first = map.values().next().unwrap().as_object().unwrap();
    assert!(first.contains_key("duration"));
    assert!(first.contains_key("average_eq_9_98"));

    let output = cli()
        .arg("dataset")
        .arg(&features_path)
        .output()
        .expect("dataset command");
    assert!(output.status.success());
    let summary: Value = serde_json::from_slice(&output.stdout).expect("summary JSON");
    assert_eq!(summary["samples"], 2);
    assert_eq!(summary["class_names"], serde_json::json!(["kick", "snare"]));
    assert_eq!(summary["class_counts"]["kick"], 1);
}

#[test]
fn inspect_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    write_tone(&wav, 440.0);
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"extraction": {"layout": "summary", "band_count": 8}}"#,
    )
    .unwrap();

    let output = cli()
        .arg("inspect")
        .arg(&wav)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("inspect command");
    assert!(output.status.success());

    let features: Value = serde_json::from_slice(&output.stdout).expect("features JSON");
    let features = features.as_object().unwrap();
    assert_eq!(features.len(), 6 + 8);
    assert!(features.contains_key("fundamental_freq"));
    assert!(features.contains_key("average_eq_7"));
}

#[test]
fn dataset_reads_piped_stdin() {
    let mut child = cli()
        .arg("dataset")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("dataset command");
    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(
            br#"{
                "data/kick/a.wav": {"duration": 0.2, "loudness_0": 0.4},
                "data/kick/b.wav": {"duration": 0.3, "loudness_0": 0.5},
                "data/hat/c.wav": {"duration": 0.1, "loudness_0": 0.2}
            }"#,
        )
        .expect("write features");

    let output = child.wait_with_output().expect("dataset output");
    assert!(
        output.status.success(),
        "dataset exited with {:?}",
        output.status.code()
    );
    let summary: Value = serde_json::from_slice(&output.stdout).expect("summary JSON");
    assert_eq!(summary["samples"], 3);
    assert_eq!(summary["feature_count"], 2);
    assert_eq!(summary["class_names"], serde_json::json!(["hat", "kick"]));
    assert_eq!(summary["class_counts"]["kick"], 2);
}

#[test]
fn failures_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();

    let output = cli()
        .arg("inspect")
        .arg(dir.path().join("missing.wav"))
        .output()
        .expect("inspect command");
    assert_eq!(output.status.code(), Some(1));

    let config = dir.path().join("broken.json");
    fs::write(&config, "{ not json").unwrap();
    let output = cli()
        .args(["extract", "--config"])
        .arg(&config)
        .output()
        .expect("extract command");
    assert_eq!(output.status.code(), Some(1));

    let output = cli()
        .arg("dataset")
        .arg(dir.path().join("missing.json"))
        .output()
        .expect("dataset command");
    assert_eq!(output.status.code(), Some(1));
}
