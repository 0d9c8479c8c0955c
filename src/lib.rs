//! One-rep-max estimation engine for streetlifting.
//!
//! Pure, synchronous computations: exercise-specific 1RM formulas, rep
//! equivalence tables built by inverting them, and personal record ranking.
//! Callers own persistence and supply body weight and record history.

pub mod domain;
pub mod equivalence;
pub mod error;
pub mod excel;
pub mod formulas;
pub mod records;

pub use domain::{
    EquivalencePoint, ExerciseFamily, PerformanceSample, PersonalRecord, ValidationLimits,
    WeightPoint,
};
pub use equivalence::{
    CalculatorResult, SolverConfig, build_equivalence_table, calculate, find_max_weight_for_reps,
};
pub use error::{LoadError, ParseError, RecordError, ValidationError};
pub use formulas::compute_one_rep_max;
pub use records::{NewRecord, RankedRecord, create_record, rank_records};
