pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod sensor;

pub use config::AppConfig;
pub use dataset::{Evaluation, LabeledSample};
pub use error::{InputError, KinotakeError, Result, SensorError};
pub use ml::{
    ClassificationResult, LogisticClassifier, ParameterTable, CLASS_LABELS, KINOKO_TAKENOKO,
    NUM_CLASSES, NUM_FEATURES,
};
pub use sensor::SensorFrame;
