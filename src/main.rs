use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use pep_grade_predictor::model::GradeModel;
use pep_grade_predictor::models::LabeledRecord;
use pep_grade_predictor::{dataset, decision, eval, features, form, report};

#[derive(Parser)]
#[command(name = "pep-grade-predictor")]
#[command(about = "PEP examination grade predictor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic sample dataset
    Seed {
        #[arg(long, default_value = "students.csv")]
        out: PathBuf,
        #[arg(long, default_value_t = 200)]
        rows: usize,
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// Train the model and predict one student's grade from a terminal form
    Predict {
        #[arg(long, default_value = "students.csv")]
        csv: PathBuf,
    },
    /// Train the model and print the held-out evaluation
    Evaluate {
        #[arg(long, default_value = "students.csv")]
        csv: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Train the model and write a markdown evaluation report
    Report {
        #[arg(long, default_value = "students.csv")]
        csv: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { out, rows, seed } => {
            dataset::write_seed(&out, rows, seed)?;
            println!("Seed dataset with {rows} rows written to {}.", out.display());
        }
        Commands::Predict { csv } => {
            let pipeline = fit(&csv)?;
            let evaluation = eval::evaluate(&pipeline.model, &pipeline.test);

            let student = form::prompt_student()?;
            let record = features::derive(student);

            println!();
            println!("Input preview:");
            println!(
                "  Age {}  Gender {}  Height {} cm  Weight {} kg  BMI {:.1}",
                record.input.age,
                record.input.gender,
                record.input.height_cm,
                record.input.weight_kg,
                record.bmi
            );
            println!(
                "  Run {} min  Pushups {}  Situps {}  Beep test {}  Attendance {:.1}%",
                record.input.run_3km_min,
                record.input.pushups,
                record.input.situps,
                record.input.beep_test,
                record.input.attendance_pct
            );
            println!(
                "  Fitness_Score {:.2}  Speed_Index {:.2}  Performance_Index {:.2}",
                record.fitness_score, record.speed_index, record.performance_index
            );

            let grade = decision::decide(&record, &pipeline.model);
            println!();
            println!("Predicted grade: {grade}");
            if decision::attendance_gated(&record) {
                println!(
                    "Attendance below {:.0}% forces grade F; the model was not consulted.",
                    decision::ATTENDANCE_CUTOFF_PCT
                );
            }

            println!();
            print_evaluation(&evaluation);
        }
        Commands::Evaluate { csv, json } => {
            let pipeline = fit(&csv)?;
            let evaluation = eval::evaluate(&pipeline.model, &pipeline.test);
            if json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                print_evaluation(&evaluation);
            }
        }
        Commands::Report { csv, out } => {
            let pipeline = fit(&csv)?;
            let evaluation = eval::evaluate(&pipeline.model, &pipeline.test);
            let report =
                report::build_report(&csv, pipeline.train_size, Utc::now(), &evaluation);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

struct Pipeline {
    model: GradeModel,
    train_size: usize,
    test: Vec<LabeledRecord>,
}

/// One-time startup path shared by every command that needs a model:
/// load the dataset, split off the held-out set, fit the classifier.
fn fit(csv: &Path) -> anyhow::Result<Pipeline> {
    let records = dataset::load(csv)?;
    println!("Loaded {} records from {}.", records.len(), csv.display());

    let (train, test) = dataset::split(records, dataset::TEST_FRACTION, dataset::SPLIT_SEED);
    let model = GradeModel::train(&train).context("failed to train the grade model")?;
    println!(
        "Trained on {} records, holding out {} for evaluation.",
        train.len(),
        test.len()
    );

    Ok(Pipeline {
        model,
        train_size: train.len(),
        test,
    })
}

fn print_evaluation(evaluation: &eval::Evaluation) {
    println!("Model performance on the held-out split:");
    println!("Accuracy: {:.3}", evaluation.accuracy);
    println!();
    println!("{}", evaluation.confusion_table());
    println!("{}", evaluation.class_report());
}
