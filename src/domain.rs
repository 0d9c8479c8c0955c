//! Domain types for lift performances and personal records.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::str::FromStr;

use crate::error::{ParseError, ValidationError};

/// Exercise families with a dedicated 1RM formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseFamily {
    PullUp,
    Dip,
    MuscleUp,
    Squat,
}

impl ExerciseFamily {
    /// Returns all family variants.
    pub fn all() -> &'static [ExerciseFamily] {
        &[
            ExerciseFamily::PullUp,
            ExerciseFamily::Dip,
            ExerciseFamily::MuscleUp,
            ExerciseFamily::Squat,
        ]
    }

    /// Returns the display name for the family.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseFamily::PullUp => "Pull-up",
            ExerciseFamily::Dip => "Dip",
            ExerciseFamily::MuscleUp => "Muscle-up",
            ExerciseFamily::Squat => "Squat",
        }
    }

    /// Stable identifier used on the command line and in JSON.
    pub fn id(&self) -> &'static str {
        match self {
            ExerciseFamily::PullUp => "pullup",
            ExerciseFamily::Dip => "dip",
            ExerciseFamily::MuscleUp => "muscleup",
            ExerciseFamily::Squat => "squat",
        }
    }

    /// True when the logged weight is the whole bar rather than a load
    /// added on top of bodyweight.
    pub fn uses_total_weight(&self) -> bool {
        matches!(self, ExerciseFamily::Squat)
    }
}

impl FromStr for ExerciseFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pullup" | "pull-up" | "pull-ups" | "pullups" | "dominada" | "dominadas" => {
                Ok(ExerciseFamily::PullUp)
            }
            "dip" | "dips" | "fondos" => Ok(ExerciseFamily::Dip),
            "muscleup" | "muscle-up" | "muscle-ups" | "muscleups" | "mu" => {
                Ok(ExerciseFamily::MuscleUp)
            }
            "squat" | "squats" | "sentadilla" | "sentadillas" => Ok(ExerciseFamily::Squat),
            _ => Err(ParseError::UnknownExercise {
                row: 0,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExerciseFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Input bounds enforced before the formulas run.
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// Minimum accepted body weight in kg.
    pub min_body_weight_kg: f64,
    /// Highest rep count the calculator accepts.
    pub max_calculator_reps: u32,
    /// Highest rep count accepted when logging a record.
    pub max_record_reps: u32,
    pub max_added_weight_muscle_up: Option<f64>,
    pub max_added_weight_pull_up: Option<f64>,
    pub max_added_weight_dip: Option<f64>,
    pub max_added_weight_squat: Option<f64>,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_body_weight_kg: 45.0,
            max_calculator_reps: 20,
            max_record_reps: 50,
            max_added_weight_muscle_up: Some(60.0),
            max_added_weight_pull_up: Some(130.0),
            max_added_weight_dip: Some(200.0),
            max_added_weight_squat: None,
        }
    }
}

impl ValidationLimits {
    /// Returns the added-weight cap for a family, if any.
    pub fn weight_cap_for(&self, family: ExerciseFamily) -> Option<f64> {
        match family {
            ExerciseFamily::MuscleUp => self.max_added_weight_muscle_up,
            ExerciseFamily::PullUp => self.max_added_weight_pull_up,
            ExerciseFamily::Dip => self.max_added_weight_dip,
            ExerciseFamily::Squat => self.max_added_weight_squat,
        }
    }
}

/// A single observed performance.
///
/// For [`ExerciseFamily::Squat`] `added_weight_kg` is the total bar weight;
/// bodyweight must not be added to it again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSample {
    pub added_weight_kg: f64,
    pub body_weight_kg: f64,
    pub reps: u32,
}

impl PerformanceSample {
    /// Creates a new sample.
    pub fn new(added_weight_kg: f64, body_weight_kg: f64, reps: u32) -> Self {
        Self {
            added_weight_kg,
            body_weight_kg,
            reps,
        }
    }

    /// Checks the sample against the calculator limits for a family.
    pub fn validate(
        &self,
        family: ExerciseFamily,
        limits: &ValidationLimits,
    ) -> Result<(), ValidationError> {
        if !self.body_weight_kg.is_finite() {
            return Err(ValidationError::NonFiniteInput("body weight"));
        }
        if !self.added_weight_kg.is_finite() {
            return Err(ValidationError::NonFiniteInput("added weight"));
        }
        if self.body_weight_kg < limits.min_body_weight_kg {
            return Err(ValidationError::BodyWeightTooLow {
                value: self.body_weight_kg,
                min: limits.min_body_weight_kg,
            });
        }
        if self.added_weight_kg < 0.0 {
            return Err(ValidationError::NegativeWeight(self.added_weight_kg));
        }
        if self.reps < 1 || self.reps > limits.max_calculator_reps {
            return Err(ValidationError::RepsOutOfRange {
                value: self.reps,
                min: 1,
                max: limits.max_calculator_reps,
            });
        }
        if let Some(cap) = limits.weight_cap_for(family)
            && self.added_weight_kg > cap
        {
            return Err(ValidationError::WeightAboveCap {
                family,
                value: self.added_weight_kg,
                cap,
            });
        }
        Ok(())
    }
}

/// One row of a reps → max weight table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquivalencePoint {
    pub reps: u32,
    pub max_weight_kg: f64,
}

/// One row of a weight → max reps table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightPoint {
    pub weight_kg: f64,
    pub max_reps: u32,
}

/// A logged lift with its 1RM frozen at creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalRecord {
    pub id: u64,
    pub family: ExerciseFamily,
    pub weight_kg: f64,
    pub reps: u32,
    pub date: NaiveDate,
    /// Kept at full precision for ranking; shown to one decimal.
    #[serde(serialize_with = "serialize_tenth")]
    pub calculated_1rm_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Rounds a weight to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Serializes a weight rounded to one decimal, leaving the stored value intact.
pub fn serialize_tenth<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to_tenth(*value))
}
