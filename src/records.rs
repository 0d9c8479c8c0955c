//! Personal record creation, ranking and progress summaries.
//!
//! A record's 1RM is computed once when it is logged and then frozen.
//! Percentages are relative to the current best of the same family and are
//! recomputed on every read, so they shift as better records arrive.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{
    ExerciseFamily, PersonalRecord, ValidationLimits, round_to_tenth, serialize_tenth,
};
use crate::error::{RecordError, ValidationError};
use crate::formulas::compute_one_rep_max;

/// A lift the athlete wants to log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub family: ExerciseFamily,
    /// Added weight, or total bar weight for squats.
    pub weight_kg: f64,
    pub reps: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl NewRecord {
    /// Checks the lift against the record-logging limits.
    pub fn validate(&self, limits: &ValidationLimits) -> Result<(), ValidationError> {
        if !self.weight_kg.is_finite() {
            return Err(ValidationError::NonFiniteInput("weight"));
        }
        if self.weight_kg < 0.0 {
            return Err(ValidationError::NegativeWeight(self.weight_kg));
        }
        if self.reps < 1 || self.reps > limits.max_record_reps {
            return Err(ValidationError::RepsOutOfRange {
                value: self.reps,
                min: 1,
                max: limits.max_record_reps,
            });
        }
        Ok(())
    }

    /// Freezes this lift into a stored record.
    pub fn into_record(self, id: u64, created: &CreatedRecord) -> PersonalRecord {
        PersonalRecord {
            id,
            family: self.family,
            weight_kg: self.weight_kg,
            reps: self.reps,
            date: self.date,
            calculated_1rm_kg: created.calculated_1rm_kg,
            notes: self.notes,
        }
    }
}

/// What the record flow hands back to the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreatedRecord {
    #[serde(serialize_with = "serialize_tenth")]
    pub calculated_1rm_kg: f64,
    pub body_weight_used_kg: f64,
}

/// Computes the frozen 1RM for a new record.
///
/// # Errors
/// * [`RecordError::Validation`] if the lift is out of bounds
/// * [`RecordError::BodyWeightNotConfigured`] if the profile has no
///   positive body weight
pub fn create_record(
    request: &NewRecord,
    body_weight_kg: Option<f64>,
    limits: &ValidationLimits,
) -> Result<CreatedRecord, RecordError> {
    request.validate(limits)?;

    let body_weight = configured_body_weight(body_weight_kg)?;
    let calculated =
        compute_one_rep_max(request.family, request.weight_kg, body_weight, request.reps);

    info!(
        "Calculated 1RM for {}: {:.2}kg (weight: {}kg, bodyweight: {}kg, reps: {})",
        request.family, calculated, request.weight_kg, body_weight, request.reps
    );

    Ok(CreatedRecord {
        calculated_1rm_kg: calculated,
        body_weight_used_kg: body_weight,
    })
}

/// Returns the body weight if it is usable for record math.
pub fn configured_body_weight(body_weight_kg: Option<f64>) -> Result<f64, RecordError> {
    match body_weight_kg {
        Some(bw) if bw.is_finite() && bw > 0.0 => Ok(bw),
        _ => Err(RecordError::BodyWeightNotConfigured),
    }
}

/// Profile check result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyWeightStatus {
    pub has_body_weight: bool,
    pub body_weight_kg: Option<f64>,
}

/// Reports whether a profile body weight is configured.
pub fn body_weight_status(body_weight_kg: Option<f64>) -> BodyWeightStatus {
    match configured_body_weight(body_weight_kg) {
        Ok(bw) => BodyWeightStatus {
            has_body_weight: true,
            body_weight_kg: Some(bw),
        },
        Err(_) => BodyWeightStatus {
            has_body_weight: false,
            body_weight_kg: None,
        },
    }
}

/// A record annotated with its standing against the best.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: PersonalRecord,
    /// 0..=100; only the top record is 100.
    pub percentage_of_best: u8,
}

/// Orders records by 1RM descending, most recent first on ties.
fn compare_for_ranking(a: &PersonalRecord, b: &PersonalRecord) -> Ordering {
    b.calculated_1rm_kg
        .total_cmp(&a.calculated_1rm_kg)
        .then_with(|| b.date.cmp(&a.date))
}

/// Percentage of `value` against `best`, for every record but the top one.
fn percentage_below_best(value: f64, best: f64) -> u8 {
    if best <= 0.0 || !best.is_finite() {
        return 0;
    }
    let pct = (value / best * 100.0).round();
    // Ties and near-ties still sit below the leader
    pct.clamp(0.0, 99.0) as u8
}

/// Ranks the records of one family.
///
/// Uses the frozen `calculated_1rm_kg`; nothing is recomputed here. The
/// first entry is always 100%.
pub fn rank_records(mut records: Vec<PersonalRecord>) -> Vec<RankedRecord> {
    records.sort_by(compare_for_ranking);

    let best = match records.first() {
        Some(r) => r.calculated_1rm_kg,
        None => return Vec::new(),
    };

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let percentage_of_best = if i == 0 {
                100
            } else {
                percentage_below_best(record.calculated_1rm_kg, best)
            };
            RankedRecord {
                record,
                percentage_of_best,
            }
        })
        .collect()
}

/// Splits a mixed history by family and ranks each group.
pub fn rank_by_family(
    records: Vec<PersonalRecord>,
) -> BTreeMap<ExerciseFamily, Vec<RankedRecord>> {
    let mut grouped: BTreeMap<ExerciseFamily, Vec<PersonalRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.family).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(family, group)| (family, rank_records(group)))
        .collect()
}

/// Best-lift overview for one family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilySummary {
    pub family: ExerciseFamily,
    #[serde(serialize_with = "serialize_tenth")]
    pub best_1rm_kg: f64,
    pub total_records: usize,
    pub latest_date: NaiveDate,
}

/// Summarizes one family, or None if it has no records.
pub fn summarize_family(
    family: ExerciseFamily,
    records: &[PersonalRecord],
) -> Option<FamilySummary> {
    let own: Vec<&PersonalRecord> = records.iter().filter(|r| r.family == family).collect();

    let best = own
        .iter()
        .map(|r| r.calculated_1rm_kg)
        .max_by(|a, b| a.total_cmp(b))?;
    let latest = own.iter().map(|r| r.date).max()?;

    Some(FamilySummary {
        family,
        best_1rm_kg: best,
        total_records: own.len(),
        latest_date: latest,
    })
}

/// Summarizes every family that has records.
///
/// Families are processed in parallel via rayon.
pub fn summarize_all(records: &[PersonalRecord]) -> Vec<FamilySummary> {
    let mut summaries: Vec<FamilySummary> = ExerciseFamily::all()
        .par_iter()
        .filter_map(|&family| summarize_family(family, records))
        .collect();
    summaries.sort_by_key(|s| s.family);
    summaries
}

/// One point on the progress chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub one_rm_kg: f64,
    pub weight_kg: f64,
    pub reps: u32,
    /// 1-based position in chronological order.
    pub record_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Headline numbers under the progress chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStats {
    pub total_records: usize,
    pub best_1rm_kg: f64,
    /// Best minus worst 1RM.
    pub progress_kg: f64,
    pub first_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub points: Vec<ProgressPoint>,
    pub stats: ProgressStats,
}

/// Builds the chronological progress series for one family's records.
///
/// Returns None for an empty history.
pub fn progress(records: &[PersonalRecord]) -> Option<ProgressReport> {
    let mut sorted: Vec<&PersonalRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let points: Vec<ProgressPoint> = sorted
        .iter()
        .enumerate()
        .map(|(i, r)| ProgressPoint {
            date: r.date,
            one_rm_kg: round_to_tenth(r.calculated_1rm_kg),
            weight_kg: r.weight_kg,
            reps: r.reps,
            record_number: i + 1,
            notes: r.notes.clone(),
        })
        .collect();

    let first_date = points.first()?.date;
    let best = points.iter().map(|p| p.one_rm_kg).fold(f64::MIN, f64::max);
    let worst = points.iter().map(|p| p.one_rm_kg).fold(f64::MAX, f64::min);

    Some(ProgressReport {
        stats: ProgressStats {
            total_records: points.len(),
            best_1rm_kg: best,
            progress_kg: round_to_tenth(best - worst),
            first_date,
        },
        points,
    })
}
