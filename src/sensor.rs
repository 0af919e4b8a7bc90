//! Sensor board frames.
//!
//! The board prints one line per sample: 18 comma-separated `analogRead()`
//! values, ordered as the 3 x 6 photo sensor array is scanned.

use serde::Serialize;
use tracing::warn;

use crate::error::SensorError;
use crate::ml::NUM_FEATURES;

/// Full-scale reading of the board's 10-bit ADC.
pub const ADC_MAX: f32 = 1023.0;

/// Range outside which a reading is suspicious but still classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRange {
    pub min: f32,
    pub max: f32,
}

impl Default for RawRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: ADC_MAX,
        }
    }
}

impl RawRange {
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One parsed sample from the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorFrame {
    pub values: [f32; NUM_FEATURES],
}

impl SensorFrame {
    pub fn new(values: [f32; NUM_FEATURES]) -> Self {
        Self { values }
    }

    /// Parse a board line using the default 10-bit ADC range.
    pub fn parse_line(line: &str) -> Result<Self, SensorError> {
        Self::parse_line_with_range(line, RawRange::default())
    }

    pub fn parse_line_with_range(line: &str, range: RawRange) -> Result<Self, SensorError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(SensorError::Empty);
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        Self::from_fields(&fields, 0, range)
    }

    /// Parse `fields` as a frame. `offset` is added to reported field indices
    /// so callers with leading columns get positions in the original line.
    pub(crate) fn from_fields(
        fields: &[&str],
        offset: usize,
        range: RawRange,
    ) -> Result<Self, SensorError> {
        if fields.len() != NUM_FEATURES {
            return Err(SensorError::FieldCount {
                expected: NUM_FEATURES + offset,
                got: fields.len() + offset,
            });
        }

        let mut values = [0.0_f32; NUM_FEATURES];
        for (i, (slot, raw)) in values.iter_mut().zip(fields).enumerate() {
            let parsed: i32 = raw.parse().map_err(|_| SensorError::InvalidValue {
                index: i + offset,
                raw: (*raw).to_string(),
            })?;
            *slot = parsed as f32;
        }

        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !range.contains(**v))
        {
            warn!(
                index = index + offset,
                value = *value,
                min = range.min,
                max = range.max,
                "sensor reading outside expected range"
            );
        }

        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "512,498,530,601,587,590,610,620,300,280,515,520,505,499,260,540,550,530";

    #[test]
    fn parses_board_line() {
        let frame = SensorFrame::parse_line(LINE).unwrap();
        assert_eq!(frame.values[0], 512.0);
        assert_eq!(frame.values[17], 530.0);
    }

    #[test]
    fn tolerates_whitespace_and_crlf() {
        let line = format!("  {}\r\n", LINE.replace(',', ", "));
        let frame = SensorFrame::parse_line(&line).unwrap();
        assert_eq!(frame, SensorFrame::parse_line(LINE).unwrap());
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!(SensorFrame::parse_line("   \r\n"), Err(SensorError::Empty));
    }

    #[test]
    fn rejects_short_line() {
        let short = LINE.rsplit_once(',').unwrap().0;
        assert_eq!(
            SensorFrame::parse_line(short),
            Err(SensorError::FieldCount {
                expected: 18,
                got: 17
            })
        );
    }

    #[test]
    fn rejects_non_integer_field() {
        let bad = LINE.replacen("498", "4x8", 1);
        assert_eq!(
            SensorFrame::parse_line(&bad),
            Err(SensorError::InvalidValue {
                index: 1,
                raw: "4x8".to_string()
            })
        );
    }

    #[test]
    fn out_of_range_values_are_kept() {
        let line = LINE.replacen("512", "2048", 1);
        let frame = SensorFrame::parse_line(&line).unwrap();
        assert_eq!(frame.values[0], 2048.0);
    }
}
