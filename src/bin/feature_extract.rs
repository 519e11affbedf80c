use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use timbre_features::batch::{to_json_string, write_json};
use timbre_features::dataset::{DatasetCache, FeatureTable};
use timbre_features::{AppConfig, BatchExtractor, FeatureExtractor};
use tracing::info;

const DEFAULT_FEATURES_PATH: &str = "./features.json";

#[derive(Parser, Debug)]
#[command(
    name = "feature_extract",
    about = "Extract loudness, pitch and spectral features from WAV samples"
)]
struct Cli {
    /// JSON config file (defaults to ./extract_config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract features for every file under a directory
    Extract {
        #[arg(default_value = "./data/")]
        data_dir: PathBuf,
        /// Write the feature map here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the features of a single file
    Inspect { file: PathBuf },
    /// Summarize a feature map as a classification dataset
    Dataset {
        /// Feature JSON written by `extract` (stdin when piped)
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { data_dir, output } => run_extract(&config, &data_dir, output),
        Commands::Inspect { file } => run_inspect(&config, &file),
        Commands::Dataset { input } => run_dataset(input),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AppConfig::from_json_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(AppConfig::load()),
    }
}

fn run_extract(config: &AppConfig, data_dir: &Path, output: Option<PathBuf>) -> Result<ExitCode> {
    let extractor = FeatureExtractor::new(config).context("invalid extraction config")?;
    let report = BatchExtractor::new(extractor)
        .run(data_dir)
        .with_context(|| format!("scanning {}", data_dir.display()))?;

    match output {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_json(&mut writer, &report.features)?;
            writer.flush()?;
            info!(output = %path.display(), files = report.features.len(), "Wrote features");
        }
        None => println!("{}", to_json_string(&report.features)?),
    }

    Ok(ExitCode::from(0))
}

fn run_inspect(config: &AppConfig, file: &Path) -> Result<ExitCode> {
    let extractor = FeatureExtractor::new(config).context("invalid extraction config")?;
    let features = extractor
        .extract_file(file)
        .with_context(|| format!("extracting {}", file.display()))?;
    println!("{}", to_json_string(&features)?);
    Ok(ExitCode::from(0))
}

fn run_dataset(input: Option<PathBuf>) -> Result<ExitCode> {
    let cache = DatasetCache::new();
    let stdin = io::stdin();
    let table: Arc<FeatureTable> = match input {
        Some(path) => load_table(&cache, &path)?,
        None if !stdin.is_terminal() => Arc::new(
            FeatureTable::from_reader(stdin.lock()).context("reading features from stdin")?,
        ),
        None => load_table(&cache, Path::new(DEFAULT_FEATURES_PATH))?,
    };

    let summary = DatasetSummary {
        samples: table.len(),
        feature_count: table.feature_names.len(),
        feature_names: &table.feature_names,
        class_names: &table.class_names,
        class_counts: table.class_counts(),
    };
    println!("{}", to_json_string(&summary)?);
    Ok(ExitCode::from(0))
}

fn load_table(cache: &DatasetCache, path: &Path) -> Result<Arc<FeatureTable>> {
    cache
        .load(path)
        .with_context(|| format!("loading {}", path.display()))
}

#[derive(Serialize)]
struct DatasetSummary<'a> {
    samples: usize,
    feature_count: usize,
    feature_names: &'a [String],
    class_names: &'a [String],
    class_counts: BTreeMap<String, usize>,
}
