use thiserror::Error;

/// Main error type for the classifier and its tooling
#[derive(Error, Debug)]
pub enum KinotakeError {
    // Classifier input errors
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    // Capture errors
    #[error("Dataset error at line {line}: {source}")]
    Dataset {
        line: u64,
        #[source]
        source: SensorError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for KinotakeError
pub type Result<T> = std::result::Result<T, KinotakeError>;

/// Rejected feature vectors and parameter inputs.
///
/// Raised before any arithmetic happens, so a failed call produces no output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("feature count mismatch: expected {expected}, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("non-finite value {value} at feature {index}")]
    NonFinite { index: usize, value: f32 },

    #[error("scale at feature {index} must be finite and > 0, got {value}")]
    InvalidScale { index: usize, value: f32 },

    #[error("folded bias for class {class} is not finite")]
    FoldOverflow { class: usize },
}

/// Errors parsing a sensor board line or a labeled capture row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("empty line")]
    Empty,

    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("field {index} is not an integer: {raw:?}")]
    InvalidValue { index: usize, raw: String },

    #[error("label {raw:?} is not a class index in [0, {num_classes})")]
    InvalidLabel { raw: String, num_classes: usize },
}
