use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::eval::Evaluation;
use crate::models::Grade;

/// Builds the markdown evaluation report for one training run.
pub fn build_report(
    dataset: &Path,
    train_size: usize,
    generated_at: DateTime<Utc>,
    evaluation: &Evaluation,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# PEP Grade Model Report");
    let _ = writeln!(
        output,
        "Generated {} from {} ({} training rows, {} held-out rows)",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        dataset.display(),
        train_size,
        evaluation.test_size
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Accuracy");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{:.3} on {} held-out records",
        evaluation.accuracy, evaluation.test_size
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Confusion Matrix");
    let _ = writeln!(output);
    let _ = writeln!(output, "Rows are actual grades, columns are predicted grades.");
    let _ = writeln!(output);
    let _ = write!(output, "| actual \\ predicted |");
    for grade in Grade::ALL {
        let _ = write!(output, " {grade} |");
    }
    let _ = writeln!(output);
    let _ = write!(output, "|---|");
    for _ in Grade::ALL {
        let _ = write!(output, "---|");
    }
    let _ = writeln!(output);
    for actual in Grade::ALL {
        let _ = write!(output, "| **{actual}** |");
        for predicted in Grade::ALL {
            let _ = write!(
                output,
                " {} |",
                evaluation.confusion[actual.class_index()][predicted.class_index()]
            );
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Per-Class Metrics");
    let _ = writeln!(output);
    let _ = writeln!(output, "| grade | precision | recall | f1-score | support |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for class in &evaluation.classes {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.2} | {} |",
            class.grade, class.precision, class.recall, class.f1, class.support
        );
    }
    let _ = writeln!(
        output,
        "| macro avg | {:.2} | {:.2} | {:.2} | {} |",
        evaluation.macro_precision,
        evaluation.macro_recall,
        evaluation.macro_f1,
        evaluation.test_size
    );
    let _ = writeln!(
        output,
        "| weighted avg | | | {:.2} | {} |",
        evaluation.weighted_f1, evaluation.test_size
    );

    output
}
