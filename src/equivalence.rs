//! Rep equivalence tables derived by inverting the 1RM formulas.
//!
//! Given an estimated 1RM, each row answers "what is the heaviest load for
//! N reps?" by bisecting on weight until the forward formula reproduces the
//! 1RM. The search assumes the formulas increase with weight at fixed reps.
//! That holds for every family except MuscleUp across its fallback seam:
//! where the closed form loses its real root the estimate drops, so rows
//! solved there can come out heavier than the row above them.

use log::debug;
use serde::Serialize;

use crate::domain::{
    EquivalencePoint, ExerciseFamily, PerformanceSample, ValidationLimits, WeightPoint,
    round_to_tenth, serialize_tenth,
};
use crate::error::ValidationError;
use crate::formulas::compute_one_rep_max;

/// Tuning for the inversion search and table shapes.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Number of rows in the reps → weight table (1..=table_len).
    pub table_len: u32,
    /// Hard cap on bisection steps.
    pub max_iterations: u32,
    /// Accept a midpoint once its 1RM is this close to the target (kg).
    pub one_rm_tolerance: f64,
    /// Stop once the bracket is narrower than this (kg).
    pub bracket_tolerance: f64,
    /// Upper search bound as a multiple of the target 1RM.
    pub search_ceiling_factor: f64,
    /// Highest rep count reported in the weight → reps table.
    pub max_table_reps: u32,
    /// Upper bound on weight → reps rows.
    pub max_weight_rows: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            table_len: 10,
            max_iterations: 50,
            one_rm_tolerance: 0.1,
            bracket_tolerance: 0.01,
            search_ceiling_factor: 1.5,
            max_table_reps: 20,
            max_weight_rows: 200,
        }
    }
}

/// Result of a single bisection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionOutcome {
    /// Accepted weight, never negative.
    pub weight_kg: f64,
    /// Forward 1RM evaluated at `weight_kg`.
    pub computed_one_rm_kg: f64,
    /// Bracket width when the search stopped.
    pub bracket_width_kg: f64,
    /// Steps taken.
    pub iterations: u32,
    /// True if the 1RM tolerance was met.
    pub converged: bool,
}

/// Finds the heaviest weight for `target_reps` whose estimate matches `one_rm_kg`.
///
/// Bisects on `[0, search_ceiling_factor × one_rm_kg]`. Terminates on the
/// 1RM tolerance, the bracket tolerance, or the iteration cap, whichever
/// comes first.
pub fn find_max_weight_for_reps(
    family: ExerciseFamily,
    target_reps: u32,
    one_rm_kg: f64,
    bodyweight_kg: f64,
    config: &SolverConfig,
) -> BisectionOutcome {
    let mut low = 0.0_f64;
    let mut high = (one_rm_kg * config.search_ceiling_factor).max(0.0);
    let mut mid = 0.0;
    let mut computed = compute_one_rep_max(family, mid, bodyweight_kg, target_reps);
    let mut iterations = 0;

    while iterations < config.max_iterations {
        iterations += 1;
        mid = (low + high) / 2.0;
        computed = compute_one_rep_max(family, mid, bodyweight_kg, target_reps);

        if (computed - one_rm_kg).abs() < config.one_rm_tolerance {
            return BisectionOutcome {
                weight_kg: mid.max(0.0),
                computed_one_rm_kg: computed,
                bracket_width_kg: high - low,
                iterations,
                converged: true,
            };
        } else if computed < one_rm_kg {
            low = mid;
        } else {
            high = mid;
        }

        if high - low < config.bracket_tolerance {
            break;
        }
    }

    debug!(
        "{} bisection for {} reps stopped without meeting tolerance: target {:.2}, got {:.2}",
        family, target_reps, one_rm_kg, computed
    );

    BisectionOutcome {
        weight_kg: mid.max(0.0),
        computed_one_rm_kg: computed,
        bracket_width_kg: high - low,
        iterations,
        converged: false,
    }
}

/// Builds the reps → max weight table with default solver settings.
pub fn build_equivalence_table(
    family: ExerciseFamily,
    one_rm_kg: f64,
    bodyweight_kg: f64,
    actual_reps: u32,
    actual_weight_kg: f64,
) -> Vec<EquivalencePoint> {
    build_equivalence_table_with(
        family,
        one_rm_kg,
        bodyweight_kg,
        actual_reps,
        actual_weight_kg,
        &SolverConfig::default(),
    )
}

/// Builds the reps → max weight table for `1..=table_len`.
///
/// The row at `actual_reps` always carries the athlete's logged weight
/// verbatim; every other row is solved by bisection. Weights are rounded
/// to one decimal.
pub fn build_equivalence_table_with(
    family: ExerciseFamily,
    one_rm_kg: f64,
    bodyweight_kg: f64,
    actual_reps: u32,
    actual_weight_kg: f64,
    config: &SolverConfig,
) -> Vec<EquivalencePoint> {
    (1..=config.table_len)
        .map(|reps| {
            let max_weight = if reps == actual_reps {
                actual_weight_kg
            } else {
                find_max_weight_for_reps(family, reps, one_rm_kg, bodyweight_kg, config).weight_kg
            };

            EquivalencePoint {
                reps,
                max_weight_kg: round_to_tenth(max_weight),
            }
        })
        .collect()
}

/// The 1RM shown to the user: the table's single-rep row.
///
/// Falls back to the rounded raw estimate only when the table has no
/// single-rep row.
pub fn headline_one_rm(table: &[EquivalencePoint], raw_one_rm_kg: f64) -> f64 {
    table
        .iter()
        .find(|p| p.reps == 1)
        .map(|p| p.max_weight_kg)
        .unwrap_or_else(|| round_to_tenth(raw_one_rm_kg))
}

/// Returns the most reps achievable at `weight_kg` without exceeding the 1RM.
///
/// Scans `1..=max_reps` and keeps the highest count whose estimate stays
/// within `tolerance` of `one_rm_kg`. Returns 0 when even a single rep
/// would exceed it.
pub fn max_reps_for_weight(
    family: ExerciseFamily,
    weight_kg: f64,
    bodyweight_kg: f64,
    one_rm_kg: f64,
    max_reps: u32,
    tolerance: f64,
) -> u32 {
    (1..=max_reps)
        .take_while(|&reps| {
            compute_one_rep_max(family, weight_kg, bodyweight_kg, reps) <= one_rm_kg + tolerance
        })
        .last()
        .unwrap_or(0)
}

/// Load step between weight → reps rows.
fn weight_step_for(family: ExerciseFamily) -> f64 {
    match family {
        ExerciseFamily::MuscleUp => 2.5,
        _ => 5.0,
    }
}

/// Builds the weight → max reps table, walking down from the 1RM to zero.
pub fn build_weight_table(
    family: ExerciseFamily,
    one_rm_kg: f64,
    bodyweight_kg: f64,
    config: &SolverConfig,
) -> Vec<WeightPoint> {
    let step = weight_step_for(family);
    let mut rows = Vec::new();
    let mut weight = one_rm_kg;

    while weight >= 0.0 && rows.len() < config.max_weight_rows {
        let max_reps = max_reps_for_weight(
            family,
            weight,
            bodyweight_kg,
            one_rm_kg,
            config.max_table_reps,
            config.one_rm_tolerance,
        );
        if max_reps > 0 {
            rows.push(WeightPoint {
                weight_kg: round_to_tenth(weight),
                max_reps,
            });
        }
        weight -= step;
    }

    rows
}

/// Everything the calculator shows for one performance.
#[derive(Debug, Clone, Serialize)]
pub struct CalculatorResult {
    pub family: ExerciseFamily,
    pub sample: PerformanceSample,
    /// Closed-form estimate before table reconciliation.
    #[serde(serialize_with = "serialize_tenth")]
    pub raw_one_rm_kg: f64,
    /// Headline 1RM, equal to the table's single-rep row.
    pub one_rm_kg: f64,
    pub equivalence_table: Vec<EquivalencePoint>,
    pub weight_table: Vec<WeightPoint>,
}

/// Runs the calculator flow: validate, estimate, tabulate.
pub fn calculate(
    family: ExerciseFamily,
    sample: PerformanceSample,
    limits: &ValidationLimits,
    config: &SolverConfig,
) -> Result<CalculatorResult, ValidationError> {
    sample.validate(family, limits)?;

    let raw_one_rm = compute_one_rep_max(
        family,
        sample.added_weight_kg,
        sample.body_weight_kg,
        sample.reps,
    );
    let equivalence_table = build_equivalence_table_with(
        family,
        raw_one_rm,
        sample.body_weight_kg,
        sample.reps,
        sample.added_weight_kg,
        config,
    );
    let one_rm = headline_one_rm(&equivalence_table, raw_one_rm);
    let weight_table = build_weight_table(family, one_rm, sample.body_weight_kg, config);

    Ok(CalculatorResult {
        family,
        sample,
        raw_one_rm_kg: raw_one_rm,
        one_rm_kg: one_rm,
        equivalence_table,
        weight_table,
    })
}
