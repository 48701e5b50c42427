use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of grade classes the classifier distinguishes.
pub const GRADE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Gender::M => "M",
            Gender::F => "F",
        })
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Gender::M),
            "F" | "f" => Ok(Gender::F),
            other => Err(format!("unknown gender {other:?}, expected M or F")),
        }
    }
}

/// Letter grade, ordered best to worst. The class index is the
/// alphabetical label encoding (A=0 .. F=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const ALL: [Grade; GRADE_COUNT] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    pub fn class_index(self) -> usize {
        match self {
            Grade::A => 0,
            Grade::B => 1,
            Grade::C => 2,
            Grade::D => 3,
            Grade::F => 4,
        }
    }

    pub fn from_class_index(index: usize) -> Option<Grade> {
        Grade::ALL.get(index).copied()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        })
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "F" => Ok(Grade::F),
            other => Err(format!("unknown grade {other:?}, expected one of A B C D F")),
        }
    }
}

/// Raw measurements for one student, as entered in the form or read
/// from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub run_3km_min: f64,
    pub pushups: u32,
    pub situps: u32,
    pub beep_test: f64,
    pub attendance_pct: f64,
}

/// Raw measurements plus the derived composite fields. Only
/// `features::derive` constructs this, so the derived values can never
/// drift from the raw ones.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub input: StudentInput,
    pub bmi: f64,
    pub fitness_score: f64,
    pub speed_index: f64,
    pub performance_index: f64,
}

/// A fully-featured record with its known grade, used for training and
/// evaluation.
#[derive(Debug, Clone)]
pub struct LabeledRecord {
    pub record: StudentRecord,
    pub grade: Grade,
}
