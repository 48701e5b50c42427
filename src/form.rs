use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::Context;

use crate::models::{Gender, StudentInput};

/// Runs the student form on the terminal. Every prompt shows the valid
/// range and a default; out-of-range or unparseable entries re-prompt,
/// so an invalid value can never reach the pipeline.
pub fn prompt_student() -> anyhow::Result<StudentInput> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    read_student(&mut input, &mut output)
}

/// Form logic over any reader/writer pair, so tests can drive it with
/// scripted input.
pub fn read_student<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<StudentInput> {
    writeln!(output, "Enter student details (press Enter for the default).")?;

    let age = prompt_in_range(input, output, "Age", 18u32, 30u32, 21u32)?;
    let gender = prompt_gender(input, output)?;
    let height_cm = prompt_in_range(input, output, "Height (cm)", 150.0, 200.0, 170.0)?;
    let weight_kg = prompt_in_range(input, output, "Weight (kg)", 40.0, 120.0, 70.0)?;
    let run_3km_min = prompt_in_range(input, output, "3 km run time (min)", 10.0, 40.0, 20.0)?;
    let pushups = prompt_in_range(input, output, "Pushups", 0u32, 35u32, 20u32)?;
    let situps = prompt_in_range(input, output, "Situps", 0u32, 35u32, 20u32)?;
    let beep_test = prompt_in_range(input, output, "Beep test score", 1.0, 12.0, 6.0)?;
    let attendance_pct = prompt_in_range(input, output, "Attendance %", 50.0, 100.0, 85.0)?;

    Ok(StudentInput {
        age,
        gender,
        height_cm,
        weight_kg,
        run_3km_min,
        pushups,
        situps,
        beep_test,
        attendance_pct,
    })
}

fn prompt_in_range<R, W, T>(
    input: &mut R,
    output: &mut W,
    label: &str,
    min: T,
    max: T,
    default: T,
) -> anyhow::Result<T>
where
    R: BufRead,
    W: Write,
    T: PartialOrd + Copy + Display + FromStr,
{
    loop {
        write!(output, "{label} [{min}-{max}] ({default}): ")?;
        output.flush()?;

        let line = read_line(input)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(default);
        }

        match trimmed.parse::<T>() {
            Ok(value) if value >= min && value <= max => return Ok(value),
            Ok(value) => {
                writeln!(output, "  {value} is outside [{min}-{max}], try again.")?;
            }
            Err(_) => {
                writeln!(output, "  could not read {trimmed:?} as a number, try again.")?;
            }
        }
    }
}

fn prompt_gender<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> anyhow::Result<Gender> {
    loop {
        write!(output, "Gender [M/F] (M): ")?;
        output.flush()?;

        let line = read_line(input)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Gender::M);
        }
        match trimmed.parse::<Gender>() {
            Ok(gender) => return Ok(gender),
            Err(message) => writeln!(output, "  {message}, try again.")?,
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read form input")?;
    anyhow::ensure!(read > 0, "form input closed before the form was complete");
    Ok(line)
}
