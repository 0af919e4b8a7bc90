//! kinotake CLI
//!
//! Commands:
//! - `kinotake classify` - Classify one frame given on the command line
//! - `kinotake stream` - Classify board frames read from stdin
//! - `kinotake evaluate` - Replay a labeled capture and report accuracy
//! - `kinotake params` - Show the compiled-in model

pub mod output;
pub mod stream;

use clap::{Parser, Subcommand};
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::AppConfig;
use crate::dataset::{load_labeled, Evaluation};
use crate::ml::params::PUBLISHED_ACCURACY;
use crate::ml::LogisticClassifier;
use crate::sensor::SensorFrame;
use output::{print_evaluation, print_items, write_result, ClassRow, OutputMode};

#[derive(Parser, Debug)]
#[command(name = "kinotake")]
#[command(author, version)]
#[command(about = "Kinoko/Takenoko light-sensor snack classifier", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <KINOTAKE_ENV>.toml)
    #[arg(short, long, env = "KINOTAKE_CONFIG", default_value = "config", global = true)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a single frame of 18 comma-separated raw readings
    Classify {
        /// Raw readings, e.g. 512,498,...,530
        #[arg(allow_hyphen_values = true)]
        values: String,
        /// Also print raw scores and softmax probabilities
        #[arg(long)]
        scores: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify board frames from stdin until EOF or Ctrl+C
    Stream {
        /// Also print raw scores and softmax probabilities
        #[arg(long)]
        scores: bool,
        /// Output one JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the model on a labeled capture (label,adc0..adc17 per row)
    Evaluate {
        /// Path to the capture CSV
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show class labels and biases of the compiled-in model
    Params {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn classify_frame(
    cfg: &AppConfig,
    values: &str,
    scores: bool,
    json: bool,
) -> anyhow::Result<()> {
    let frame = SensorFrame::parse_line_with_range(values, cfg.sensor.raw_range())?;
    let classifier = LogisticClassifier::published();
    let result = if scores || cfg.output.include_scores {
        classifier.classify_with_scores(frame.as_slice())?
    } else {
        classifier.classify(frame.as_slice())?
    };

    let mode = OutputMode::from_json_flag(json || cfg.output.json);
    let mut out = stdout().lock();
    write_result(&mut out, &result, mode)?;
    out.flush()?;
    Ok(())
}

pub async fn stream_stdin(cfg: &AppConfig, scores: bool, json: bool) -> anyhow::Result<()> {
    let opts = stream::StreamOptions {
        include_scores: scores || cfg.output.include_scores,
        mode: OutputMode::from_json_flag(json || cfg.output.json),
        range: cfg.sensor.raw_range(),
    };
    let reader = tokio::io::BufReader::new(tokio::io::stdin());

    info!("reading frames from stdin");
    let mut out = stdout();
    stream::run_stream(
        reader,
        &mut out,
        LogisticClassifier::published(),
        opts,
        shutdown_signal(),
    )
    .await?;
    Ok(())
}

pub fn evaluate_capture(cfg: &AppConfig, path: &Path, json: bool) -> anyhow::Result<()> {
    let samples = load_labeled(path, cfg.sensor.raw_range())?;
    let eval = Evaluation::run(&LogisticClassifier::published(), &samples)?;
    info!(
        samples = eval.total,
        accuracy = eval.accuracy,
        "evaluation complete"
    );
    print_evaluation(&eval, OutputMode::from_json_flag(json || cfg.output.json))
}

pub fn show_params(cfg: &AppConfig, json: bool) -> anyhow::Result<()> {
    let table = LogisticClassifier::published().table();
    let rows: Vec<ClassRow> = table
        .labels
        .iter()
        .zip(table.biases.iter())
        .enumerate()
        .map(|(index, (label, bias))| ClassRow {
            index,
            label: *label,
            bias: *bias,
        })
        .collect();

    let mode = OutputMode::from_json_flag(json || cfg.output.json);
    if mode == OutputMode::Table {
        println!(
            "{} classes x {} raw features, published accuracy {:.6}",
            table.num_classes(),
            table.num_features(),
            PUBLISHED_ACCURACY
        );
    }
    print_items(&rows, mode)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_classify_command() {
        let cli = Cli::try_parse_from([
            "kinotake",
            "classify",
            "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
            "--scores",
        ])
        .unwrap();
        match cli.command {
            Commands::Classify { values, scores, json } => {
                assert!(values.starts_with("0,0"));
                assert!(scores);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from("config"));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["kinotake", "params", "--config", "/etc/kinotake"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/kinotake"));
    }

    #[test]
    fn config_dir_can_come_from_environment() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let arg = cmd.get_arguments().find(|a| a.get_id() == "config").unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("KINOTAKE_CONFIG")));
    }

    #[test]
    fn evaluate_requires_path() {
        assert!(Cli::try_parse_from(["kinotake", "evaluate"]).is_err());
    }
}
