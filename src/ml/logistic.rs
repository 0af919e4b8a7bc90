//! Multinomial logistic-regression inference (CPU-only, `f32`).
//!
//! A class score is `bias[i] + Σ_j weights[i][j] * x[j]`, accumulated in a
//! single pass in ascending feature order so results are reproducible across
//! runs and platforms. The predicted class is the argmax of the scores; softmax
//! is monotonic, so probabilities are only computed for reporting.
//!
//! Design goals:
//! - Stable, deterministic, allocation-free on the decision path.
//! - Shapes fixed at compile time, inputs validated before any arithmetic.

use serde::Serialize;
use tracing::{debug, trace};

use super::params::{KINOKO_TAKENOKO, NUM_CLASSES, NUM_FEATURES};
use crate::error::InputError;

/// Weights, biases and labels of a `C`-class, `F`-feature linear classifier.
///
/// Index `i` of `weights`, `biases` and `labels` always describes the same
/// class; the array types make any other shape unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable<const C: usize, const F: usize> {
    /// Weights shape: [C][F]
    pub weights: [[f32; F]; C],
    /// Bias shape: [C]
    pub biases: [f32; C],
    pub labels: [&'static str; C],
}

impl<const C: usize, const F: usize> ParameterTable<C, F> {
    const HAS_CLASSES: () = assert!(C > 0, "a parameter table needs at least one class");

    pub const fn num_classes(&self) -> usize {
        C
    }

    pub const fn num_features(&self) -> usize {
        F
    }

    /// Build a raw-input table from coefficients trained on standardized
    /// inputs `z = (x - mean) / scale`.
    ///
    /// `w*[k][i] = W[k][i] / scale[i]` and
    /// `b*[k] = b[k] - Σ_i W[k][i] * mean[i] / scale[i]`, so classifying raw
    /// `x` with the result matches classifying `z` with the unfolded table. Folding
    /// is done in `f64` and rounded once to `f32`.
    pub fn fold_standardization(
        weights: &[[f32; F]; C],
        biases: &[f32; C],
        mean: &[f32; F],
        scale: &[f32; F],
        labels: [&'static str; C],
    ) -> Result<Self, InputError> {
        if let Some((index, &value)) = scale
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s <= 0.0)
        {
            return Err(InputError::InvalidScale { index, value });
        }
        check_finite(mean)?;

        let mut folded_w = [[0.0_f32; F]; C];
        let mut folded_b = [0.0_f32; C];
        for k in 0..C {
            let mut shift = 0.0_f64;
            for i in 0..F {
                let w = f64::from(weights[k][i]);
                let s = f64::from(scale[i]);
                folded_w[k][i] = (w / s) as f32;
                shift += w * f64::from(mean[i]) / s;
            }
            folded_b[k] = (f64::from(biases[k]) - shift) as f32;
        }

        // A tiny (e.g. subnormal) scale can push the folded values past f32.
        for (k, row) in folded_w.iter().enumerate() {
            if let Some(index) = row.iter().position(|w| !w.is_finite()) {
                return Err(InputError::InvalidScale {
                    index,
                    value: scale[index],
                });
            }
            if !folded_b[k].is_finite() {
                return Err(InputError::FoldOverflow { class: k });
            }
        }

        Ok(Self {
            weights: folded_w,
            biases: folded_b,
            labels,
        })
    }

    /// Reject anything that is not exactly `F` finite values.
    pub fn validate_features(&self, features: &[f32]) -> Result<(), InputError> {
        if features.len() != F {
            return Err(InputError::FeatureCount {
                expected: F,
                got: features.len(),
            });
        }
        check_finite(features)
    }

    /// Raw linear score for every class.
    pub fn scores(&self, features: &[f32]) -> Result<[f32; C], InputError> {
        self.validate_features(features)?;

        let mut scores = self.biases;
        for (score, row) in scores.iter_mut().zip(self.weights.iter()) {
            for (w, x) in row.iter().zip(features) {
                *score += w * x;
            }
        }
        Ok(scores)
    }

    /// Predict a class without keeping the score vector.
    pub fn classify(&self, features: &[f32]) -> Result<ClassificationResult, InputError> {
        let scores = self.scores(features)?;
        Ok(self.decide(&scores, false))
    }

    /// Predict a class and report raw scores plus softmax probabilities.
    pub fn classify_with_scores(
        &self,
        features: &[f32],
    ) -> Result<ClassificationResult, InputError> {
        let scores = self.scores(features)?;
        Ok(self.decide(&scores, true))
    }

    fn decide(&self, scores: &[f32; C], keep_scores: bool) -> ClassificationResult {
        #[allow(clippy::let_unit_value)]
        let () = Self::HAS_CLASSES;

        let class_index = argmax(scores).unwrap_or(0);
        let (scores, probabilities) = if keep_scores {
            (Some(scores.to_vec()), Some(softmax(scores)))
        } else {
            (None, None)
        };

        ClassificationResult {
            class_index,
            label: self.labels[class_index],
            scores,
            probabilities,
        }
    }
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub class_index: usize,
    pub label: &'static str,
    /// Raw linear scores, one per class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f32>>,
    /// Softmax of `scores` (reporting only, never used for the decision)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f32>>,
}

/// Classifier handle over a read-only parameter table.
///
/// `Copy` and `Sync`: share it freely across threads, no locking needed.
#[derive(Debug, Clone, Copy)]
pub struct LogisticClassifier<'a, const C: usize = NUM_CLASSES, const F: usize = NUM_FEATURES> {
    table: &'a ParameterTable<C, F>,
}

impl LogisticClassifier<'static> {
    /// Classifier over the compiled-in Kinoko/Takenoko table.
    pub fn published() -> Self {
        Self::new(&KINOKO_TAKENOKO)
    }
}

impl Default for LogisticClassifier<'static> {
    fn default() -> Self {
        Self::published()
    }
}

impl<'a, const C: usize, const F: usize> LogisticClassifier<'a, C, F> {
    pub fn new(table: &'a ParameterTable<C, F>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a ParameterTable<C, F> {
        self.table
    }

    pub fn labels(&self) -> &'a [&'static str; C] {
        &self.table.labels
    }

    pub fn scores(&self, features: &[f32]) -> Result<[f32; C], InputError> {
        self.table.scores(features)
    }

    pub fn classify(&self, features: &[f32]) -> Result<ClassificationResult, InputError> {
        let result = self.table.classify(features)?;
        debug!(class = result.class_index, label = result.label, "classified frame");
        Ok(result)
    }

    pub fn classify_with_scores(
        &self,
        features: &[f32],
    ) -> Result<ClassificationResult, InputError> {
        let result = self.table.classify_with_scores(features)?;
        trace!(scores = ?result.scores, "class scores");
        debug!(class = result.class_index, label = result.label, "classified frame");
        Ok(result)
    }
}

/// Index of the largest value. Exact ties go to the lowest index.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &v) in values.iter().enumerate() {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Numerically-stable softmax.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

fn check_finite(values: &[f32]) -> Result<(), InputError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(InputError::NonFinite {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_table() -> ParameterTable<3, 2> {
        ParameterTable {
            weights: [[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]],
            biases: [0.0, 0.0, 0.5],
            labels: ["a", "b", "c"],
        }
    }

    #[test]
    fn scores_start_from_bias() {
        let table = tiny_table();
        let scores = table.scores(&[2.0, 3.0]).unwrap();
        assert_eq!(scores, [2.0, 3.0, -4.5]);
    }

    #[test]
    fn classify_picks_highest_score() {
        let table = tiny_table();
        let result = table.classify(&[2.0, 3.0]).unwrap();
        assert_eq!(result.class_index, 1);
        assert_eq!(result.label, "b");
        assert!(result.scores.is_none());
        assert!(result.probabilities.is_none());

        let result = table.classify(&[-1.0, -1.0]).unwrap();
        assert_eq!(result.class_index, 2);
    }

    #[test]
    fn classify_with_scores_keeps_decision() {
        let table = tiny_table();
        let plain = table.classify(&[0.3, 0.1]).unwrap();
        let detailed = table.classify_with_scores(&[0.3, 0.1]).unwrap();
        assert_eq!(plain.class_index, detailed.class_index);

        let probs = detailed.probabilities.unwrap();
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(argmax(&probs), Some(detailed.class_index));
    }

    #[test]
    fn rejects_wrong_length() {
        let table = tiny_table();
        assert_eq!(
            table.classify(&[1.0]),
            Err(InputError::FeatureCount {
                expected: 2,
                got: 1
            })
        );
        assert!(table.classify(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        let table = tiny_table();
        match table.classify(&[1.0, f32::NAN]) {
            Err(InputError::NonFinite { index, value }) => {
                assert_eq!(index, 1);
                assert!(value.is_nan());
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
        assert!(matches!(
            table.classify(&[f32::NEG_INFINITY, 0.0]),
            Err(InputError::NonFinite { index: 0, .. })
        ));
    }

    #[test]
    fn argmax_ties_go_low() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[5.0, 5.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn softmax_is_stable_for_large_scores() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fold_matches_standardized_model() {
        let weights = [[0.8, -0.4], [-0.3, 0.9]];
        let biases = [0.1, -0.2];
        let mean = [500.0, 300.0];
        let scale = [120.0, 80.0];
        let folded =
            ParameterTable::fold_standardization(&weights, &biases, &mean, &scale, ["x", "y"])
                .unwrap();
        let standardized = ParameterTable {
            weights,
            biases,
            labels: ["x", "y"],
        };

        let raw = [620.0_f32, 180.0];
        let z = [(raw[0] - mean[0]) / scale[0], (raw[1] - mean[1]) / scale[1]];
        let a = folded.scores(&raw).unwrap();
        let b = standardized.scores(&z).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4, "{x} vs {y}");
        }
    }

    #[test]
    fn fold_rejects_bad_scale() {
        let err = ParameterTable::fold_standardization(
            &[[1.0, 1.0]],
            &[0.0],
            &[0.0, 0.0],
            &[1.0, 0.0],
            ["only"],
        )
        .unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidScale {
                index: 1,
                value: 0.0
            }
        );
    }

    #[test]
    fn fold_rejects_non_finite_mean() {
        for bad in [f32::NAN, f32::INFINITY] {
            let err = ParameterTable::fold_standardization(
                &[[1.0, 1.0]],
                &[0.0],
                &[0.0, bad],
                &[1.0, 1.0],
                ["only"],
            )
            .unwrap_err();
            assert!(matches!(err, InputError::NonFinite { index: 1, .. }));
        }
    }

    #[test]
    fn fold_rejects_subnormal_scale_overflow() {
        let err = ParameterTable::fold_standardization(
            &[[1.0, 1.0]],
            &[0.0],
            &[0.0, 0.0],
            &[1.0, 1e-40],
            ["only"],
        )
        .unwrap_err();
        assert!(matches!(err, InputError::InvalidScale { index: 1, .. }));
    }

    #[test]
    fn fold_rejects_overflowing_bias() {
        let err = ParameterTable::fold_standardization(
            &[[1.0e30]],
            &[0.0],
            &[1.0e30],
            &[1.0],
            ["only"],
        )
        .unwrap_err();
        assert_eq!(err, InputError::FoldOverflow { class: 0 });
    }

    #[test]
    fn handle_is_send_sync_copy() {
        fn assert_traits<T: Send + Sync + Copy>() {}
        assert_traits::<LogisticClassifier<'static>>();
    }
}
