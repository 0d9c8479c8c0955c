//! Excel ingestion of personal record histories.

use calamine::{Data, DataType, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;
use log::{info, warn};
use std::path::Path;
use std::str::FromStr;

use crate::domain::{ExerciseFamily, PersonalRecord, ValidationLimits};
use crate::error::{LoadError, ParseError};
use crate::records::{NewRecord, configured_body_weight, create_record};

/// Expected column names (case-insensitive).
const COL_DATE: &str = "date";
const COL_EXERCISE: &str = "exercise";
const COL_WEIGHT: &str = "weight";
const COL_REPS: &str = "repetitions";
const COL_NOTES: &str = "notes";
const COL_ONE_RM: &str = "1rm";

/// Finds column indices from the header row.
struct ColumnIndices {
    date: usize,
    exercise: usize,
    weight: usize,
    reps: usize,
    notes: Option<usize>,
    one_rm: Option<usize>,
}

impl ColumnIndices {
    fn from_header(header: &[Data]) -> Result<Self, ParseError> {
        let position = |name: &str| -> Option<usize> {
            header.iter().position(|cell| {
                cell.get_string()
                    .is_some_and(|s| s.trim().eq_ignore_ascii_case(name))
            })
        };
        let find_column = |name: &str| -> Result<usize, ParseError> {
            position(name).ok_or_else(|| ParseError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find_column(COL_DATE)?,
            exercise: find_column(COL_EXERCISE)?,
            weight: find_column(COL_WEIGHT)?,
            reps: find_column(COL_REPS)?,
            notes: position(COL_NOTES),
            one_rm: position(COL_ONE_RM),
        })
    }
}

/// One parsed spreadsheet row before its 1RM is settled.
struct RecordRow {
    lift: NewRecord,
    frozen_one_rm: Option<f64>,
}

/// Loads a personal record history from an Excel file.
///
/// Rows carrying a `1rm` value keep it as their frozen estimate. Rows
/// without one are computed now from `body_weight_kg`, which must then be
/// configured. Malformed rows are logged and skipped.
///
/// # Errors
/// Returns a parse error if the file cannot be read or lacks required
/// columns, and `BodyWeightNotConfigured` if a row needs a 1RM computed
/// without a body weight.
pub fn load_records<P: AsRef<Path>>(
    path: P,
    body_weight_kg: Option<f64>,
    limits: &ValidationLimits,
) -> Result<Vec<PersonalRecord>, LoadError> {
    let rows = read_rows(path.as_ref())?;
    let records = resolve_rows(rows, body_weight_kg, limits)?;

    info!("Loaded {} personal records", records.len());
    Ok(records)
}

/// Settles the 1RM of each parsed row.
///
/// Every row is checked against the record limits first; failures are
/// logged and skipped whether or not the row carries a frozen 1RM.
fn resolve_rows(
    rows: Vec<(usize, RecordRow)>,
    body_weight_kg: Option<f64>,
    limits: &ValidationLimits,
) -> Result<Vec<PersonalRecord>, LoadError> {
    if rows.iter().any(|(_, r)| r.frozen_one_rm.is_none()) {
        configured_body_weight(body_weight_kg)?;
    }

    let mut records = Vec::with_capacity(rows.len());
    for (row_num, row) in rows {
        if let Err(e) = row.lift.validate(limits) {
            warn!("Skipping row {}: {}", row_num, e);
            continue;
        }

        let calculated = match row.frozen_one_rm {
            Some(one_rm) => one_rm,
            None => create_record(&row.lift, body_weight_kg, limits)?.calculated_1rm_kg,
        };

        let lift = row.lift;
        records.push(PersonalRecord {
            id: row_num as u64,
            family: lift.family,
            weight_kg: lift.weight_kg,
            reps: lift.reps,
            date: lift.date,
            calculated_1rm_kg: calculated,
            notes: lift.notes,
        });
    }

    Ok(records)
}

/// Reads the first worksheet into row-numbered lifts.
fn read_rows(path: &Path) -> Result<Vec<(usize, RecordRow)>, ParseError> {
    if !path.exists() {
        return Err(ParseError::FileNotFound(path.display().to_string()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ParseError::CannotRead(format!("{}: {}", path.display(), e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| ParseError::InvalidFormat("workbook has no sheets".to_string()))?;

    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        ParseError::CannotRead(format!("cannot read sheet '{}': {}", sheet_name, e))
    })?;

    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("empty worksheet".to_string()))?;

    let indices = ColumnIndices::from_header(header)?;

    let mut parsed = Vec::new();
    for (row_idx, row) in rows.enumerate() {
        let row_num = row_idx + 2; // +1 for 0-index, +1 for header row

        // Skip empty rows silently (common at end of spreadsheets)
        if row[indices.date] == Data::Empty {
            continue;
        }

        match parse_row(row, &indices, row_num) {
            Ok(r) => parsed.push((row_num, r)),
            Err(e) => warn!("{}", e),
        }
    }

    Ok(parsed)
}

fn parse_row(
    row: &[Data],
    indices: &ColumnIndices,
    row_num: usize,
) -> Result<RecordRow, ParseError> {
    let date = parse_date(&row[indices.date], row_num)?;
    let family = parse_exercise(&row[indices.exercise], row_num)?;
    let weight_kg = parse_weight(&row[indices.weight], row_num)?;
    let reps = parse_reps(&row[indices.reps], row_num)?;
    let notes = indices
        .notes
        .and_then(|i| row.get(i))
        .and_then(parse_notes);
    let frozen_one_rm = match indices.one_rm.and_then(|i| row.get(i)) {
        Some(cell) => parse_one_rm(cell, row_num)?,
        None => None,
    };

    Ok(RecordRow {
        lift: NewRecord {
            family,
            weight_kg,
            reps,
            date,
            notes,
        },
        frozen_one_rm,
    })
}

/// Parses a date from a cell.
fn parse_date(cell: &Data, row: usize) -> Result<NaiveDate, ParseError> {
    match cell {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| ndt.date())
            .ok_or_else(|| ParseError::InvalidDate {
                row,
                value: format!("{:?}", dt),
            }),
        Data::DateTimeIso(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate {
                row,
                value: s.clone(),
            })
        }
        Data::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
            .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
            .map_err(|_| ParseError::InvalidDate {
                row,
                value: s.clone(),
            }),
        Data::Empty => Err(ParseError::InvalidDate {
            row,
            value: "(empty)".to_string(),
        }),
        other => Err(ParseError::InvalidDate {
            row,
            value: format!("{:?}", other),
        }),
    }
}

/// Parses a weight value from a cell. Zero is allowed (bodyweight only).
fn parse_weight(cell: &Data, row: usize) -> Result<f64, ParseError> {
    let invalid = |value: String| ParseError::InvalidWeight { row, value };

    let weight = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().map_err(|_| invalid(s.clone()))?,
        Data::Empty => return Err(invalid("(empty)".to_string())),
        other => return Err(invalid(format!("{:?}", other))),
    };

    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(invalid(weight.to_string()))
    }
}

/// Parses repetitions from a cell. An empty cell means a single.
fn parse_reps(cell: &Data, row: usize) -> Result<u32, ParseError> {
    match cell {
        Data::Float(f) => {
            let reps = *f as u32;
            if reps > 0 {
                Ok(reps)
            } else {
                Err(ParseError::InvalidReps {
                    row,
                    value: f.to_string(),
                })
            }
        }
        Data::Int(i) => {
            if *i > 0 {
                Ok(*i as u32)
            } else {
                Err(ParseError::InvalidReps {
                    row,
                    value: i.to_string(),
                })
            }
        }
        Data::String(s) => {
            let reps: u32 = s.trim().parse().map_err(|_| ParseError::InvalidReps {
                row,
                value: s.clone(),
            })?;
            if reps > 0 {
                Ok(reps)
            } else {
                Err(ParseError::InvalidReps {
                    row,
                    value: s.clone(),
                })
            }
        }
        Data::Empty => Ok(1),
        other => Err(ParseError::InvalidReps {
            row,
            value: format!("{:?}", other),
        }),
    }
}

/// Parses an exercise family from a cell.
fn parse_exercise(cell: &Data, row: usize) -> Result<ExerciseFamily, ParseError> {
    match cell {
        Data::String(s) => {
            ExerciseFamily::from_str(s).map_err(|_| ParseError::UnknownExercise {
                row,
                value: s.clone(),
            })
        }
        Data::Empty => Err(ParseError::UnknownExercise {
            row,
            value: "(empty)".to_string(),
        }),
        other => Err(ParseError::UnknownExercise {
            row,
            value: format!("{:?}", other),
        }),
    }
}

/// Parses an optional frozen 1RM. Empty cells mean "not yet computed".
fn parse_one_rm(cell: &Data, row: usize) -> Result<Option<f64>, ParseError> {
    match cell {
        Data::Empty => Ok(None),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        _ => parse_weight(cell, row).map(Some),
    }
}

fn parse_notes(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
