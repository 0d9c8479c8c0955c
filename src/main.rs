use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use liftmax::domain::{ExerciseFamily, PerformanceSample, ValidationLimits};
use liftmax::equivalence::{CalculatorResult, SolverConfig, calculate};
use liftmax::error::RecordError;
use liftmax::excel::load_records;
use liftmax::records::{
    BodyWeightStatus, CreatedRecord, FamilySummary, NewRecord, ProgressReport, RankedRecord,
    body_weight_status, configured_body_weight, create_record, progress, rank_by_family,
    summarize_all,
};

/// One-rep-max calculator and personal record ranking for streetlifting.
#[derive(Parser, Debug)]
#[command(name = "liftmax")]
#[command(about = "Estimate 1RM, build rep equivalence tables and rank personal records")]
#[command(version)]
struct Args {
    /// Athlete bodyweight in kg.
    /// Can also be set via LIFTMAX_BODY_WEIGHT environment variable.
    #[arg(long, global = true, env = "LIFTMAX_BODY_WEIGHT")]
    body_weight: Option<f64>,

    /// Print JSON instead of a text report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate a 1RM and its rep equivalences without saving anything.
    Calc {
        /// pullup, dip, muscleup or squat
        family: ExerciseFamily,
        /// Added weight in kg (total bar weight for squats)
        added_weight: f64,
        /// Repetitions performed
        reps: u32,
        /// Number of rows in the reps table
        #[arg(long, default_value_t = 10)]
        table_len: u32,
    },
    /// Compute the frozen 1RM for a new personal record.
    Record {
        family: ExerciseFamily,
        /// Added weight in kg (total bar weight for squats)
        weight: f64,
        reps: u32,
        /// Date of the lift (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Rank a record history stored in an Excel file.
    Rank {
        /// Path to the .xlsx file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Only show one family
        #[arg(long)]
        family: Option<ExerciseFamily>,
    },
    /// Check whether a body weight is configured.
    Profile,
}

#[derive(Serialize)]
struct RecordOutput {
    #[serde(flatten)]
    created: CreatedRecord,
    family: ExerciseFamily,
    weight_kg: f64,
    reps: u32,
    date: NaiveDate,
}

#[derive(Serialize)]
struct RankOutput {
    summaries: Vec<FamilySummary>,
    rankings: BTreeMap<ExerciseFamily, Vec<RankedRecord>>,
    progress: BTreeMap<ExerciseFamily, ProgressReport>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let limits = ValidationLimits::default();

    match args.command {
        Command::Calc {
            family,
            added_weight,
            reps,
            table_len,
        } => {
            let body_weight = configured_body_weight(args.body_weight)
                .map_err(report_record_error)?;
            let solver = SolverConfig {
                table_len,
                ..SolverConfig::default()
            };
            let sample = PerformanceSample::new(added_weight, body_weight, reps);
            let result = calculate(family, sample, &limits, &solver)
                .with_context(|| format!("Invalid {} input", family))?;

            if args.json {
                print_json(&result)?;
            } else {
                print_calculation(&result);
            }
        }
        Command::Record {
            family,
            weight,
            reps,
            date,
            notes,
        } => {
            let request = NewRecord {
                family,
                weight_kg: weight,
                reps,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                notes,
            };
            let created = create_record(&request, args.body_weight, &limits)
                .map_err(report_record_error)?;

            if args.json {
                print_json(&RecordOutput {
                    created,
                    family,
                    weight_kg: request.weight_kg,
                    reps: request.reps,
                    date: request.date,
                })?;
            } else {
                println!(
                    "{} PR on {}: {}kg × {} reps",
                    family.display_name(),
                    request.date,
                    request.weight_kg,
                    request.reps
                );
                println!(
                    "Calculated 1RM: {:.1}kg (using bodyweight: {}kg)",
                    created.calculated_1rm_kg, created.body_weight_used_kg
                );
            }
        }
        Command::Rank { file, family } => {
            let records = load_records(&file, args.body_weight, &limits)
                .with_context(|| format!("Failed to load records from {}", file.display()))?;
            let records: Vec<_> = records
                .into_iter()
                .filter(|r| family.is_none_or(|f| r.family == f))
                .collect();

            let summaries = summarize_all(&records);
            let progress_by_family: BTreeMap<ExerciseFamily, ProgressReport> =
                ExerciseFamily::all()
                    .iter()
                    .filter_map(|&f| {
                        let own: Vec<_> =
                            records.iter().filter(|r| r.family == f).cloned().collect();
                        progress(&own).map(|p| (f, p))
                    })
                    .collect();
            let rankings = rank_by_family(records);

            let output = RankOutput {
                summaries,
                rankings,
                progress: progress_by_family,
            };
            if args.json {
                print_json(&output)?;
            } else {
                print_rankings(&output);
            }
        }
        Command::Profile => {
            let status = body_weight_status(args.body_weight);
            if args.json {
                print_json(&status)?;
            } else {
                print_profile(&status);
            }
        }
    }

    Ok(())
}

/// Adds a user-facing hint to record errors before they bubble up.
fn report_record_error(err: RecordError) -> anyhow::Error {
    if let Some(action) = err.action() {
        log::warn!("Record rejected, action required: {}", action);
        eprintln!("Configure your bodyweight with --body-weight or LIFTMAX_BODY_WEIGHT");
    }
    anyhow::Error::new(err)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn print_calculation(result: &CalculatorResult) {
    let unit = if result.family.uses_total_weight() {
        "total"
    } else {
        "added"
    };

    println!();
    println!("=== {} ===", result.family.display_name());
    println!();
    println!(
        "Input: {}kg {} × {} reps (bodyweight {}kg)",
        result.sample.added_weight_kg, unit, result.sample.reps, result.sample.body_weight_kg
    );
    println!("Estimated 1RM ({}): {:.1}kg", unit, result.one_rm_kg);

    println!();
    println!("Reps  Max weight");
    for point in &result.equivalence_table {
        let marker = if point.reps == result.sample.reps {
            " ✓"
        } else {
            ""
        };
        println!("{:4}  {:6.1}kg{}", point.reps, point.max_weight_kg, marker);
    }

    if !result.weight_table.is_empty() {
        println!();
        println!("Weight    Max reps");
        for point in &result.weight_table {
            println!("{:6.1}kg  {:4}", point.weight_kg, point.max_reps);
        }
    }
}

fn print_rankings(output: &RankOutput) {
    if output.summaries.is_empty() {
        println!("No personal records found");
        return;
    }

    println!();
    println!("=== Personal Record Summary ===");
    println!();
    for summary in &output.summaries {
        println!(
            "{:10} best {:6.1}kg  {:3} records  (latest {})",
            summary.family.display_name(),
            summary.best_1rm_kg,
            summary.total_records,
            summary.latest_date
        );
    }

    for (family, ranked) in &output.rankings {
        println!();
        println!("=== {} Ranking ===", family.display_name());
        println!();
        for (i, entry) in ranked.iter().enumerate() {
            let r = &entry.record;
            println!(
                "{:3}. {}  {:6.1}kg × {:2}  1RM {:6.1}kg  {:3}%{}",
                i + 1,
                r.date,
                r.weight_kg,
                r.reps,
                r.calculated_1rm_kg,
                entry.percentage_of_best,
                r.notes
                    .as_deref()
                    .map(|n| format!("  ({})", n))
                    .unwrap_or_default()
            );
        }

        if let Some(report) = output.progress.get(family) {
            let stats = &report.stats;
            println!();
            println!(
                "Total PRs: {}  Best 1RM: {}kg  Progress: +{:.1}kg  First PR: {}",
                stats.total_records, stats.best_1rm_kg, stats.progress_kg, stats.first_date
            );
        }
    }
}

fn print_profile(status: &BodyWeightStatus) {
    match status.body_weight_kg {
        Some(bw) => println!("Bodyweight configured: {}kg", bw),
        None => println!("Bodyweight not configured"),
    }
}
