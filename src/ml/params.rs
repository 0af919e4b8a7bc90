//! Published Kinoko/Takenoko logistic-regression parameters.
//!
//! Generated from a scikit-learn multinomial `LogisticRegression` trained on
//! standardized captures, with the `StandardScaler` mean/scale folded into the
//! coefficients. The table therefore expects RAW `analogRead()` values
//! (0–1023) from the 3 x 6 photo sensor array. Do not standardize inputs
//! before classifying them; doing so scales them twice.

use super::logistic::ParameterTable;

pub const NUM_CLASSES: usize = 4;
pub const NUM_FEATURES: usize = 18;

/// Accuracy on the held-out test split when the table was generated.
pub const PUBLISHED_ACCURACY: f32 = 0.997403;

/// Class index -> label, aligned with `LOGI_W` rows and `LOGI_B`.
pub const CLASS_LABELS: [&str; NUM_CLASSES] = [
    "Kinoko (Right)",
    "Kinoko (Left)",
    "Takenoko (Right)",
    "Takenoko (Left)",
];

/// Weights shape: [NUM_CLASSES][NUM_FEATURES]
pub const LOGI_W: [[f32; NUM_FEATURES]; NUM_CLASSES] = [
    [
        -0.001150, -0.000048, -0.000483, -0.014574, -0.006470, 0.002959, -0.007836, -0.006714,
        0.023815, 0.028519, -0.009030, -0.005501, -0.009236, 0.003254, 0.035436, 0.006570,
        -0.007197, 0.008009,
    ],
    [
        -0.007194, -0.016230, -0.008811, -0.009085, 0.003488, -0.003790, -0.014362, -0.006255,
        0.000436, 0.029730, 0.005795, -0.004808, 0.009666, -0.012019, -0.004684, 0.014124,
        0.031659, -0.014096,
    ],
    [
        0.009177, 0.004145, -0.010558, 0.011819, 0.010470, 0.002841, 0.011832, 0.005108,
        -0.014920, -0.029496, 0.004978, 0.003305, 0.002114, 0.010719, -0.012804, -0.013142,
        -0.018977, -0.000393,
    ],
    [
        -0.000833, 0.012134, 0.019852, 0.011840, -0.007487, -0.002011, 0.010367, 0.007861,
        -0.009331, -0.028752, -0.001742, 0.007005, -0.002543, -0.001954, -0.017948, -0.007553,
        -0.005485, 0.006480,
    ],
];

/// Bias shape: [NUM_CLASSES]
pub const LOGI_B: [f32; NUM_CLASSES] = [4.626888, 8.354758, -7.063268, -5.918378];

/// The published table. Read-only for the whole process lifetime.
pub static KINOKO_TAKENOKO: ParameterTable<NUM_CLASSES, NUM_FEATURES> = ParameterTable {
    weights: LOGI_W,
    biases: LOGI_B,
    labels: CLASS_LABELS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_generation_order() {
        assert_eq!(KINOKO_TAKENOKO.labels[0], "Kinoko (Right)");
        assert_eq!(KINOKO_TAKENOKO.labels[1], "Kinoko (Left)");
        assert_eq!(KINOKO_TAKENOKO.labels[2], "Takenoko (Right)");
        assert_eq!(KINOKO_TAKENOKO.labels[3], "Takenoko (Left)");
    }

    #[test]
    fn coefficients_stay_in_published_magnitude() {
        for row in &KINOKO_TAKENOKO.weights {
            assert!(row.iter().all(|w| w.is_finite() && w.abs() < 0.04));
        }
        assert!(KINOKO_TAKENOKO.biases.iter().all(|b| b.abs() < 10.0));
    }
}
