//! Live classification of board frames read line by line.
//!
//! Malformed lines, including bytes that are not UTF-8, are logged and
//! skipped, the same way the capture logger treats serial noise. The loop ends
//! on EOF or when `shutdown` resolves.

use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use super::output::{write_result, OutputMode};
use crate::ml::LogisticClassifier;
use crate::sensor::{RawRange, SensorFrame};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub classified: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    pub include_scores: bool,
    pub mode: OutputMode,
    pub range: RawRange,
}

pub async fn run_stream<R, W, S>(
    reader: R,
    out: &mut W,
    classifier: LogisticClassifier<'_>,
    opts: StreamOptions,
    shutdown: S,
) -> anyhow::Result<StreamSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = ()>,
{
    let mut lines = reader.split(b'\n');
    let mut summary = StreamSummary::default();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, stopping stream");
                break;
            }
            line = lines.next_segment() => line?,
        };
        let Some(bytes) = line else {
            break;
        };
        let line = String::from_utf8_lossy(&bytes);
        if line.trim().is_empty() {
            continue;
        }

        let frame = match SensorFrame::parse_line_with_range(&line, opts.range) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, line = %line, "skipping frame");
                summary.skipped += 1;
                continue;
            }
        };

        let result = if opts.include_scores {
            classifier.classify_with_scores(frame.as_slice())?
        } else {
            classifier.classify(frame.as_slice())?
        };
        write_result(out, &result, opts.mode)?;
        out.flush()?;
        summary.classified += 1;
    }

    info!(
        classified = summary.classified,
        skipped = summary.skipped,
        "stream finished"
    );
    Ok(summary)
}
