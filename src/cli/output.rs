//! Output formatting for `kinotake` commands.
//!
//! Supports two modes: human-readable text/tables (default) and JSON (--json).

use serde::Serialize;
use std::io::Write;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

use crate::dataset::Evaluation;
use crate::ml::ClassificationResult;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// One row of `kinotake params`.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ClassRow {
    pub index: usize,
    pub label: &'static str,
    pub bias: f32,
}

/// Write a single prediction as one line (text) or one compact JSON object.
pub fn write_result<W: Write>(
    out: &mut W,
    result: &ClassificationResult,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            write!(out, "{} {}", result.class_index, result.label)?;
            if let Some(scores) = &result.scores {
                write!(out, " scores={}", format_values(scores))?;
            }
            if let Some(probs) = &result.probabilities {
                write!(out, " probs={}", format_values(probs))?;
            }
            writeln!(out)?;
        }
        OutputMode::Json => {
            writeln!(out, "{}", serde_json::to_string(result)?)?;
        }
    }
    Ok(())
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn print_evaluation(eval: &Evaluation, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => println!("{}", render_evaluation(eval)),
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(eval)?),
    }
    Ok(())
}

/// Accuracy summary followed by the confusion matrix with a recall column.
pub fn render_evaluation(eval: &Evaluation) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["actual \\ predicted".to_string()];
    header.extend(eval.labels.iter().map(|l| l.to_string()));
    header.push("recall".to_string());
    builder.push_record(header);

    for (i, row) in eval.confusion.iter().enumerate() {
        let mut record = vec![eval.labels[i].to_string()];
        record.extend(row.iter().map(|n| n.to_string()));
        record.push(match eval.recall[i] {
            Some(r) => format!("{:.4}", r),
            None => "-".to_string(),
        });
        builder.push_record(record);
    }

    format!(
        "samples: {}  correct: {}  accuracy: {:.4}\n{}",
        eval.total,
        eval.correct,
        eval.accuracy,
        builder.build()
    )
}

fn format_values(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(","))
}
