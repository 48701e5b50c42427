use crate::models::{Grade, StudentRecord};

/// Minimum attendance required to be graded by the model at all.
pub const ATTENDANCE_CUTOFF_PCT: f64 = 80.0;

/// The trained-model seam: anything that can map a fully-featured
/// record to a grade label.
pub trait GradeClassifier {
    fn predict(&self, record: &StudentRecord) -> Grade;
}

/// Final grade for one student. The attendance rule is a hard override
/// evaluated before the model: below the cutoff the classifier is never
/// consulted, at or above it the classifier's label is returned verbatim.
pub fn decide<C: GradeClassifier>(record: &StudentRecord, classifier: &C) -> Grade {
    if record.input.attendance_pct < ATTENDANCE_CUTOFF_PCT {
        return Grade::F;
    }
    classifier.predict(record)
}

/// True when the attendance gate (not the model) decided the grade.
pub fn attendance_gated(record: &StudentRecord) -> bool {
    record.input.attendance_pct < ATTENDANCE_CUTOFF_PCT
}
