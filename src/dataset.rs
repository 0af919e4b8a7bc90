//! Labeled captures and offline evaluation.
//!
//! A capture is a CSV file without header where each row is
//! `label,adc0,...,adc17`: the class index followed by one raw board frame.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{KinotakeError, Result, SensorError};
use crate::ml::{LogisticClassifier, NUM_CLASSES, NUM_FEATURES};
use crate::sensor::{RawRange, SensorFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabeledSample {
    pub label: usize,
    pub frame: SensorFrame,
}

/// Parse one `label,adc0..adc17` record.
pub fn parse_labeled_record(
    record: &StringRecord,
    range: RawRange,
) -> std::result::Result<LabeledSample, SensorError> {
    let fields: Vec<&str> = record.iter().collect();
    let Some((raw_label, rest)) = fields.split_first() else {
        return Err(SensorError::Empty);
    };

    let label = raw_label
        .parse::<usize>()
        .ok()
        .filter(|l| *l < NUM_CLASSES)
        .ok_or_else(|| SensorError::InvalidLabel {
            raw: (*raw_label).to_string(),
            num_classes: NUM_CLASSES,
        })?;
    let frame = SensorFrame::from_fields(rest, 1, range)?;

    Ok(LabeledSample { label, frame })
}

/// Read every non-blank record of a capture. The first bad record aborts with
/// its 1-based line number.
pub fn read_labeled<R: Read>(reader: R, range: RawRange) -> Result<Vec<LabeledSample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let sample = parse_labeled_record(&record, range)
            .map_err(|source| KinotakeError::Dataset { line, source })?;
        samples.push(sample);
    }
    Ok(samples)
}

pub fn parse_labeled(content: &str, range: RawRange) -> Result<Vec<LabeledSample>> {
    read_labeled(content.as_bytes(), range)
}

pub fn load_labeled<P: AsRef<Path>>(path: P, range: RawRange) -> Result<Vec<LabeledSample>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let samples = read_labeled(BufReader::new(file), range)?;
    info!(path = %path.display(), samples = samples.len(), "loaded labeled capture");
    Ok(samples)
}

/// Accuracy report for a classifier over labeled captures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub labels: Vec<&'static str>,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// `confusion[actual][predicted]`
    pub confusion: Vec<Vec<usize>>,
    /// Per-class recall; `None` when the capture has no samples of that class.
    pub recall: Vec<Option<f64>>,
}

impl Evaluation {
    pub fn run<const C: usize>(
        classifier: &LogisticClassifier<'_, C, NUM_FEATURES>,
        samples: &[LabeledSample],
    ) -> Result<Self> {
        let mut confusion = vec![vec![0usize; C]; C];
        for (idx, sample) in samples.iter().enumerate() {
            if sample.label >= C {
                return Err(KinotakeError::Validation(format!(
                    "sample {idx} has label {} but the classifier has {C} classes",
                    sample.label
                )));
            }
            let result = classifier.classify(sample.frame.as_slice())?;
            confusion[sample.label][result.class_index] += 1;
        }

        let total = samples.len();
        let correct: usize = (0..C).map(|i| confusion[i][i]).sum();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        let recall = confusion
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let support: usize = row.iter().sum();
                (support > 0).then(|| row[i] as f64 / support as f64)
            })
            .collect();

        debug!(total, correct, accuracy, "evaluation finished");

        Ok(Self {
            labels: classifier.labels().to_vec(),
            total,
            correct,
            accuracy,
            confusion,
            recall,
        })
    }
}
