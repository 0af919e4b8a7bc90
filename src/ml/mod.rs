//! Snack classification (deploy-safe inference).
//!
//! The model is a fixed-size linear classifier compiled into the binary, so
//! inference needs no model files and no runtime allocation beyond the result.

pub mod logistic;
pub mod params;

pub use logistic::{argmax, softmax, ClassificationResult, LogisticClassifier, ParameterTable};
pub use params::{CLASS_LABELS, KINOKO_TAKENOKO, NUM_CLASSES, NUM_FEATURES};
