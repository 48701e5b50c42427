use std::fmt::Write;

use serde::Serialize;

use crate::model::GradeModel;
use crate::models::{Grade, LabeledRecord, GRADE_COUNT};

/// Per-class quality numbers, sklearn classification-report shape.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassMetrics {
    pub grade: Grade,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Model quality against the held-out split: scalar accuracy, the
/// grade-by-grade confusion matrix, and per-class precision/recall/F1.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub test_size: usize,
    /// `confusion[actual][predicted]`, rows and columns in A..F order.
    pub confusion: [[usize; GRADE_COUNT]; GRADE_COUNT],
    pub classes: Vec<ClassMetrics>,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub weighted_f1: f64,
}

/// Scores the trained model on the held-out records. The gate is not
/// applied here: the evaluation measures the classifier itself, exactly
/// as the training labels were fit.
pub fn evaluate(model: &GradeModel, test: &[LabeledRecord]) -> Evaluation {
    let records: Vec<_> = test.iter().map(|l| l.record.clone()).collect();
    let predicted = model.predict_batch(&records);
    let actual: Vec<Grade> = test.iter().map(|l| l.grade).collect();
    score(&actual, &predicted)
}

/// Computes every metric from parallel actual/predicted label slices.
pub fn score(actual: &[Grade], predicted: &[Grade]) -> Evaluation {
    debug_assert_eq!(actual.len(), predicted.len());

    let mut confusion = [[0usize; GRADE_COUNT]; GRADE_COUNT];
    let mut correct = 0usize;
    for (a, p) in actual.iter().zip(predicted.iter()) {
        confusion[a.class_index()][p.class_index()] += 1;
        if a == p {
            correct += 1;
        }
    }

    let total = actual.len();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    let mut classes = Vec::with_capacity(GRADE_COUNT);
    for grade in Grade::ALL {
        let i = grade.class_index();
        let true_positives = confusion[i][i];
        let predicted_count: usize = (0..GRADE_COUNT).map(|row| confusion[row][i]).sum();
        let support: usize = confusion[i].iter().sum();

        let precision = ratio(true_positives, predicted_count);
        let recall = ratio(true_positives, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        classes.push(ClassMetrics {
            grade,
            precision,
            recall,
            f1,
            support,
        });
    }

    let macro_precision = classes.iter().map(|c| c.precision).sum::<f64>() / GRADE_COUNT as f64;
    let macro_recall = classes.iter().map(|c| c.recall).sum::<f64>() / GRADE_COUNT as f64;
    let macro_f1 = classes.iter().map(|c| c.f1).sum::<f64>() / GRADE_COUNT as f64;
    let weighted_f1 = if total == 0 {
        0.0
    } else {
        classes
            .iter()
            .map(|c| c.f1 * c.support as f64)
            .sum::<f64>()
            / total as f64
    };

    Evaluation {
        accuracy,
        test_size: total,
        confusion,
        classes,
        macro_precision,
        macro_recall,
        macro_f1,
        weighted_f1,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Evaluation {
    /// Confusion matrix as an aligned text table, actual grades down,
    /// predicted grades across.
    pub fn confusion_table(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "actual\\pred");
        for grade in Grade::ALL {
            let _ = write!(out, " {grade:>5}");
        }
        let _ = writeln!(out);
        for actual in Grade::ALL {
            let _ = write!(out, "{actual:>11}");
            for predicted in Grade::ALL {
                let _ = write!(
                    out,
                    " {:>5}",
                    self.confusion[actual.class_index()][predicted.class_index()]
                );
            }
            let _ = writeln!(out);
        }
        out
    }

    /// Per-class precision/recall/F1 report in the familiar
    /// classification-report layout.
    pub fn class_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        );
        for class in &self.classes {
            let _ = writeln!(
                out,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.grade.to_string(),
                class.precision,
                class.recall,
                class.f1,
                class.support
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "accuracy", "", "", format!("{:.2}", self.accuracy), self.test_size
        );
        let _ = writeln!(
            out,
            "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg", self.macro_precision, self.macro_recall, self.macro_f1, self.test_size
        );
        let _ = writeln!(
            out,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "weighted avg", "", "", self.weighted_f1, self.test_size
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_predictions_score_one() {
        let labels = vec![Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];
        let evaluation = score(&labels, &labels);
        assert_abs_diff_eq!(evaluation.accuracy, 1.0);
        for class in &evaluation.classes {
            assert_abs_diff_eq!(class.precision, 1.0);
            assert_abs_diff_eq!(class.recall, 1.0);
            assert_abs_diff_eq!(class.f1, 1.0);
            assert_eq!(class.support, 1);
        }
    }

    #[test]
    fn hand_computed_confusion_matrix() {
        // Actual:    A A A B B F
        // Predicted: A B A B B F
        let actual = vec![Grade::A, Grade::A, Grade::A, Grade::B, Grade::B, Grade::F];
        let predicted = vec![Grade::A, Grade::B, Grade::A, Grade::B, Grade::B, Grade::F];
        let evaluation = score(&actual, &predicted);

        assert_abs_diff_eq!(evaluation.accuracy, 5.0 / 6.0, epsilon = 1e-12);
        assert_eq!(evaluation.confusion[0][0], 2); // A -> A
        assert_eq!(evaluation.confusion[0][1], 1); // A -> B
        assert_eq!(evaluation.confusion[1][1], 2); // B -> B
        assert_eq!(evaluation.confusion[4][4], 1); // F -> F

        let a = &evaluation.classes[Grade::A.class_index()];
        assert_abs_diff_eq!(a.precision, 1.0);
        assert_abs_diff_eq!(a.recall, 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(a.support, 3);

        let b = &evaluation.classes[Grade::B.class_index()];
        assert_abs_diff_eq!(b.precision, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.recall, 1.0);
    }

    #[test]
    fn absent_class_scores_zero_without_panicking() {
        let actual = vec![Grade::A, Grade::A];
        let predicted = vec![Grade::A, Grade::A];
        let evaluation = score(&actual, &predicted);
        let d = &evaluation.classes[Grade::D.class_index()];
        assert_abs_diff_eq!(d.precision, 0.0);
        assert_abs_diff_eq!(d.recall, 0.0);
        assert_abs_diff_eq!(d.f1, 0.0);
        assert_eq!(d.support, 0);
    }

    #[test]
    fn empty_slices_do_not_divide_by_zero() {
        let evaluation = score(&[], &[]);
        assert_abs_diff_eq!(evaluation.accuracy, 0.0);
        assert_abs_diff_eq!(evaluation.weighted_f1, 0.0);
    }

    #[test]
    fn tables_render_every_grade() {
        let labels = vec![Grade::A, Grade::F];
        let evaluation = score(&labels, &labels);
        let table = evaluation.confusion_table();
        let report = evaluation.class_report();
        for grade in Grade::ALL {
            assert!(table.contains(&grade.to_string()));
            assert!(report.contains(&grade.to_string()));
        }
        assert!(report.contains("macro avg"));
    }
}
