use anyhow::anyhow;
use linfa::prelude::*;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};

use crate::decision::GradeClassifier;
use crate::models::{Gender, Grade, LabeledRecord, StudentRecord};

/// Numeric columns, in order: Age, Height_cm, Weight_kg, BMI,
/// Run_3km_Min, Pushups, Situps, Beep_Test, Attendance_%,
/// Fitness_Score, Speed_Index, Performance_Index.
const NUMERIC_FEATURES: usize = 12;
/// Numeric columns plus the one-hot Gender indicator (M = 1, F = 0;
/// F is the dropped first category).
const FEATURE_COUNT: usize = NUMERIC_FEATURES + 1;

const MAX_ITERATIONS: u64 = 1000;

/// Trained grade classifier: a per-column standard scaler fitted on the
/// training split plus a multinomial logistic regression. Immutable
/// after construction; shared by reference for the process lifetime.
pub struct GradeModel {
    means: Array1<f64>,
    stds: Array1<f64>,
    fitted: MultiFittedLogisticRegression<f64, usize>,
}

impl GradeModel {
    pub fn train(train: &[LabeledRecord]) -> anyhow::Result<GradeModel> {
        anyhow::ensure!(!train.is_empty(), "training split is empty");

        let mut numeric = Array2::zeros((train.len(), NUMERIC_FEATURES));
        for (row, labeled) in train.iter().enumerate() {
            let values = numeric_features(&labeled.record);
            for (col, value) in values.into_iter().enumerate() {
                numeric[[row, col]] = value;
            }
        }

        let means = numeric
            .mean_axis(ndarray::Axis(0))
            .ok_or_else(|| anyhow!("training split is empty"))?;
        let stds = numeric.std_axis(ndarray::Axis(0), 0.0);
        // A constant column must not divide by zero.
        let stds = stds.mapv(|s| if s > 1e-12 { s } else { 1.0 });

        let encoder = FeatureEncoder {
            means: &means,
            stds: &stds,
        };
        let mut matrix = Array2::zeros((train.len(), FEATURE_COUNT));
        for (row, labeled) in train.iter().enumerate() {
            for (col, value) in encoder.feature_row(&labeled.record).into_iter().enumerate() {
                matrix[[row, col]] = value;
            }
        }
        let targets = Array1::from_vec(train.iter().map(|l| l.grade.class_index()).collect());

        let dataset = Dataset::new(matrix, targets);
        let fitted = MultiLogisticRegression::default()
            .max_iterations(MAX_ITERATIONS)
            .fit(&dataset)
            .map_err(|e| anyhow!("failed to fit the grade classifier: {e}"))?;

        Ok(GradeModel {
            means,
            stds,
            fitted,
        })
    }

    /// Predicts the classifier label for each record, without the
    /// attendance gate. Evaluation uses this directly.
    pub fn predict_batch(&self, records: &[StudentRecord]) -> Vec<Grade> {
        if records.is_empty() {
            return Vec::new();
        }

        let encoder = FeatureEncoder {
            means: &self.means,
            stds: &self.stds,
        };
        let mut matrix = Array2::zeros((records.len(), FEATURE_COUNT));
        for (row, record) in records.iter().enumerate() {
            for (col, value) in encoder.feature_row(record).into_iter().enumerate() {
                matrix[[row, col]] = value;
            }
        }

        let labels = self.fitted.predict(&matrix);
        labels
            .iter()
            // Labels are the class indices fed in at training time.
            .map(|&label| Grade::from_class_index(label).unwrap_or(Grade::F))
            .collect()
    }
}

impl GradeClassifier for GradeModel {
    fn predict(&self, record: &StudentRecord) -> Grade {
        self.predict_batch(std::slice::from_ref(record))[0]
    }
}

/// Borrowed view over the scaler parameters, used both while fitting
/// and at inference time so the two paths share one encoding.
struct FeatureEncoder<'a> {
    means: &'a Array1<f64>,
    stds: &'a Array1<f64>,
}

impl FeatureEncoder<'_> {
    fn feature_row(&self, record: &StudentRecord) -> [f64; FEATURE_COUNT] {
        let numeric = numeric_features(record);
        let mut row = [0.0; FEATURE_COUNT];
        for (col, value) in numeric.into_iter().enumerate() {
            row[col] = (value - self.means[col]) / self.stds[col];
        }
        row[NUMERIC_FEATURES] = match record.input.gender {
            Gender::M => 1.0,
            Gender::F => 0.0,
        };
        row
    }
}

fn numeric_features(record: &StudentRecord) -> [f64; NUMERIC_FEATURES] {
    [
        record.input.age as f64,
        record.input.height_cm,
        record.input.weight_kg,
        record.bmi,
        record.input.run_3km_min,
        record.input.pushups as f64,
        record.input.situps as f64,
        record.input.beep_test,
        record.input.attendance_pct,
        record.fitness_score,
        record.speed_index,
        record.performance_index,
    ]
}
