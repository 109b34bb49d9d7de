//! stay-predict - one-shot length-of-stay prediction from the command line
//!
//! Reads one admission record as JSON (file argument or stdin) and prints
//! the predicted stay category.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use stay_core::constants::{APP_NAME, APP_VERSION, DEFAULT_BUNDLE_DIR};
use stay_core::{AgeBanding, BucketingProfile, PipelineConfig, Predictor, RawRecord};

#[derive(Debug, Parser)]
#[command(name = "stay-predict", version, about = "Predict hospital length of stay for one admission")]
struct Cli {
    /// Model bundle directory (or its bundle.json)
    #[arg(short, long, env = "MODEL_BUNDLE", default_value = DEFAULT_BUNDLE_DIR)]
    bundle: PathBuf,

    /// Bucketing rules the model was trained with
    #[arg(long, value_enum, default_value_t = BucketingProfile::VariantA)]
    profile: BucketingProfile,

    /// Age banding for numeric ages
    #[arg(long, value_enum, default_value_t = AgeBanding::Decades)]
    age_banding: AgeBanding,

    /// Also print the bucketed record and the non-zero features
    #[arg(long)]
    explain: bool,

    /// JSON record; reads stdin when omitted
    record: Option<PathBuf>,
}

/// Read one JSON record from `path`, or from `stdin` when no path is given
fn read_record(path: Option<&PathBuf>, mut stdin: impl Read) -> anyhow::Result<RawRecord> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read record {}", path.display()))?,
        None => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .context("Failed to read record from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("Record must be a JSON object of field → value")
}

fn run(cli: Cli, stdin: impl Read, out: &mut impl Write) -> anyhow::Result<()> {
    let config = PipelineConfig::new(cli.profile, cli.age_banding);
    let predictor = Predictor::load(&cli.bundle, config)
        .with_context(|| format!("Failed to load model bundle {}", cli.bundle.display()))?;

    let raw = read_record(cli.record.as_ref(), stdin)?;

    if cli.explain {
        let bucketed = predictor.bucket(&raw);
        writeln!(out, "Bucketed record:")?;
        for (name, value) in bucketed.iter() {
            writeln!(out, "  {:<36} {}", name, value)?;
        }
        if let Ok(alignment) = predictor.align(&bucketed) {
            writeln!(out, "Non-zero features:")?;
            for (name, value) in alignment.vector.nonzero(predictor.schema()) {
                writeln!(out, "  {:<48} {}", name, value)?;
            }
            for dropped in &alignment.dropped {
                writeln!(out, "  (no training column for {}='{}')", dropped.field, dropped.value)?;
            }
        }
    }

    let prediction = predictor.predict(&raw).context("Prediction failed")?;
    writeln!(out, "Prediction: {}", prediction.label)?;
    if cli.explain {
        if let Some(probabilities) = &prediction.probabilities {
            writeln!(out, "Probabilities: {:?}", probabilities)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    match run(Cli::parse(), io::stdin().lock(), &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_core::constants::BUNDLE_MANIFEST;

    /// Long stay exactly when the merged surgery department is set
    const TREES: &str = r#"{
        "n_features": 3, "n_classes": 2, "learning_rate": 1.0, "init": [0.0],
        "stages": [[{"nodes": [
            {"feature": 1, "threshold": 0.5, "left": 1, "right": 2},
            {"value": -2.0}, {"value": 2.0}
        ]}]]
    }"#;

    fn write_bundle(dir: &std::path::Path) {
        let manifest = serde_json::json!({
            "name": "cli_test",
            "train_columns": ["Bed_Grade", "Department_TB & Chest disease + surgery", "Age_21-30"],
            "model": { "kind": "tree_ensemble", "path": "trees.json" }
        });
        fs::write(dir.join("trees.json"), TREES).unwrap();
        fs::write(dir.join(BUNDLE_MANIFEST), manifest.to_string()).unwrap();
    }

    fn cli(bundle: &std::path::Path, record: Option<PathBuf>, explain: bool) -> Cli {
        let mut args = vec![
            "stay-predict".to_string(),
            "--bundle".to_string(),
            bundle.display().to_string(),
        ];
        if explain {
            args.push("--explain".to_string());
        }
        if let Some(record) = record {
            args.push(record.display().to_string());
        }
        Cli::parse_from(args)
    }

    fn run_to_string(cli: Cli, stdin: &str) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(cli, stdin.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_predicts_from_stdin() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());

        let output = run_to_string(
            cli(dir.path(), None, false),
            r#"{"Bed_Grade": 2, "Department": "surgery", "Age": 24}"#,
        )
        .unwrap();

        assert_eq!(output, "Prediction: 31 days or more\n");
    }

    #[test]
    fn test_predicts_from_file_with_explain() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());
        let record = dir.path().join("record.json");
        fs::write(&record, r#"{"Bed_Grade": 3, "Department": "gynecology", "Age": 24}"#).unwrap();

        let output = run_to_string(cli(dir.path(), Some(record), true), "").unwrap();

        assert!(output.contains("Bucketed record:"));
        assert!(output.contains("Non-zero features:"));
        assert!(output.contains("Age_21-30"));
        assert!(output.contains("(no training column for Department='gynecology')"));
        assert!(output.contains("Prediction: 30 days or less"));
        assert!(output.contains("Probabilities:"));
    }

    #[test]
    fn test_failures_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());

        let missing = run_to_string(cli(dir.path(), None, false), r#"{"Department": "surgery"}"#);
        let err = missing.unwrap_err();
        assert!(format!("{:#}", err).contains("Bed_Grade"));

        assert!(run_to_string(cli(dir.path(), None, false), "not json").is_err());

        let empty = tempfile::tempdir().unwrap();
        assert!(run_to_string(cli(empty.path(), None, false), "{}").is_err());
    }
}
