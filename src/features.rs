use crate::models::{StudentInput, StudentRecord};

/// Derives the composite fields from one student's raw measurements.
///
/// This is the only constructor of [`StudentRecord`]: the training-data
/// path and the live-query path both go through it, so the model always
/// sees identically derived features.
pub fn derive(input: StudentInput) -> StudentRecord {
    let bmi = round1(input.weight_kg / (input.height_cm / 100.0).powi(2));
    let fitness_score = (input.pushups as f64 + input.situps as f64 + input.beep_test) / 3.0;
    let speed_index = 30.0 - input.run_3km_min;
    let performance_index = (fitness_score + speed_index) / 2.0;

    StudentRecord {
        input,
        bmi,
        fitness_score,
        speed_index,
        performance_index,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use approx::assert_abs_diff_eq;

    fn sample_input() -> StudentInput {
        StudentInput {
            age: 21,
            gender: Gender::M,
            height_cm: 170.0,
            weight_kg: 70.0,
            run_3km_min: 20.0,
            pushups: 20,
            situps: 20,
            beep_test: 6.0,
            attendance_pct: 85.0,
        }
    }

    #[test]
    fn derives_composite_scores_exactly() {
        let record = derive(sample_input());
        assert_abs_diff_eq!(record.fitness_score, 46.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(record.speed_index, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            record.performance_index,
            (46.0 / 3.0 + 10.0) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn reference_scenario_matches_expected_values() {
        // Age 21, M, 170cm, 70kg, 20min run, 20/20 pushups/situps, beep 6.0.
        let record = derive(sample_input());
        assert_abs_diff_eq!(record.bmi, 24.2, epsilon = 1e-12);
        assert_abs_diff_eq!(record.fitness_score, 15.333333333333334, epsilon = 1e-9);
        assert_abs_diff_eq!(record.speed_index, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(record.performance_index, 12.666666666666668, epsilon = 1e-9);
    }

    #[test]
    fn bmi_rounds_to_one_decimal() {
        let mut input = sample_input();
        input.height_cm = 180.0;
        input.weight_kg = 75.0;
        // 75 / 1.8^2 = 23.148... -> 23.1
        assert_abs_diff_eq!(derive(input).bmi, 23.1, epsilon = 1e-12);
    }

    #[test]
    fn slow_run_gives_negative_speed_index() {
        let mut input = sample_input();
        input.run_3km_min = 40.0;
        assert_abs_diff_eq!(derive(input).speed_index, -10.0, epsilon = 1e-12);
    }

    #[test]
    fn raw_fields_pass_through_unchanged() {
        let input = sample_input();
        let record = derive(input.clone());
        assert_eq!(record.input, input);
    }
}
