//! Bulk-import row engine.
//!
//! Input is an ordered sequence of row records (column name → string value)
//! produced by parsing a delimited file on the client. Each row is validated
//! against the rule set of its import type; valid rows are parsed into typed
//! records and invalid rows are rejected with a per-row reason. Numeric
//! fields are coerced leniently: a missing or non-numeric value falls back to
//! a type-specific default instead of failing the row.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One candidate row: mapping from column name to raw string value.
#[derive(Clone, Debug, Default, Deserialize, utoipa::ToSchema)]
#[schema(value_type = Object)]
pub struct RawRow(pub BTreeMap<String, String>);

impl RawRow {
    /// Trimmed value of a column, treating blank as absent.
    fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Required field: present and non-empty after trimming.
    fn require(&self, field: &str) -> Result<String, String> {
        self.get(field)
            .map(str::to_string)
            .ok_or_else(|| format!("missing required field '{field}'"))
    }

    /// Lenient integer coercion: missing or non-numeric falls back to `default`.
    fn int_or(&self, field: &str, default: i32) -> i32 {
        self.get(field)
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(default)
    }
}

/// Body of every `POST /resource/bulk` endpoint.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct BulkImportRequest {
    /// Ordered candidate rows, one object per line of the source file.
    pub rows: Vec<RawRow>,
}

/// Result of a bulk import: how many rows were persisted, and why the rest
/// were not.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BulkImportResponse {
    pub inserted: usize,
    pub rejected: Vec<RowRejection>,
}

/// A rejected row with its position in the input batch (0-based) and reason.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RowRejection {
    pub index: usize,
    pub reason: String,
}

/// Result of validating a batch: parsed valid rows plus per-row rejections.
#[derive(Debug)]
pub struct BulkOutcome<T> {
    pub valid: Vec<T>,
    pub rejected: Vec<RowRejection>,
}

// Defaults applied by lenient numeric coercion.
pub const DEFAULT_DURATION_YEARS: i32 = 4;
pub const DEFAULT_CREDIT_HOURS: i32 = 3;
pub const DEFAULT_LAB_HOURS: i32 = 0;
pub const DEFAULT_SEMESTER: i32 = 1;
pub const DEFAULT_COURSE_TYPE: &str = "Core";

#[derive(Debug, PartialEq, Eq)]
pub struct ProgramRow {
    pub code: String,
    pub title: String,
    pub duration_years: i32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CourseRow {
    pub code: String,
    pub title: String,
    pub credit_hours: i32,
    pub lab_hours: i32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PloRow {
    pub plo_number: i32,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StudentRow {
    pub name: String,
    pub reg_no: String,
    pub email: Option<String>,
    pub batch: String,
}

/// Study-plan row with both codes already resolved to ids.
#[derive(Debug, PartialEq, Eq)]
pub struct StudyPlanRow {
    pub program_id: i32,
    pub course_id: i32,
    pub semester: i32,
    pub course_type: String,
}

/// Collects the outcome of a per-row closure over the whole batch.
fn validate_rows<T>(
    rows: &[RawRow],
    mut parse: impl FnMut(&RawRow) -> Result<T, String>,
) -> BulkOutcome<T> {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match parse(row) {
            Ok(parsed) => valid.push(parsed),
            Err(reason) => rejected.push(RowRejection { index, reason }),
        }
    }
    BulkOutcome { valid, rejected }
}

/// Joins all missing-field errors of a row into one rejection reason.
fn require_all(row: &RawRow, fields: &[&str]) -> Result<Vec<String>, String> {
    let mut values = Vec::with_capacity(fields.len());
    let mut missing = Vec::new();
    for &field in fields {
        match row.require(field) {
            Ok(v) => values.push(v),
            Err(e) => missing.push(e),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(missing.join("; "))
    }
}

/// Program rows require `code`, `title`, `duration_years`.
pub fn parse_program_rows(rows: &[RawRow]) -> BulkOutcome<ProgramRow> {
    validate_rows(rows, |row| {
        let mut values = require_all(row, &["code", "title", "duration_years"])?.into_iter();
        let code = values.next().unwrap_or_default();
        let title = values.next().unwrap_or_default();
        Ok(ProgramRow {
            code,
            title,
            duration_years: row.int_or("duration_years", DEFAULT_DURATION_YEARS),
        })
    })
}

/// Course rows require `code`, `title`, `credit_hours`.
pub fn parse_course_rows(rows: &[RawRow]) -> BulkOutcome<CourseRow> {
    validate_rows(rows, |row| {
        let mut values = require_all(row, &["code", "title", "credit_hours"])?.into_iter();
        let code = values.next().unwrap_or_default();
        let title = values.next().unwrap_or_default();
        Ok(CourseRow {
            code,
            title,
            credit_hours: row.int_or("credit_hours", DEFAULT_CREDIT_HOURS),
            lab_hours: row.int_or("lab_hours", DEFAULT_LAB_HOURS),
        })
    })
}

/// PLO rows require `title`. The outcome number defaults to the row's
/// position in the batch (1-based) when absent or non-numeric.
pub fn parse_plo_rows(rows: &[RawRow]) -> BulkOutcome<PloRow> {
    let mut position = 0;
    validate_rows(rows, move |row| {
        position += 1;
        let title = row.require("title")?;
        Ok(PloRow {
            plo_number: row.int_or("plo_number", position),
            title,
            description: row.get("description").map(str::to_string),
        })
    })
}

/// Student rows require `name`, `reg_no`, `batch`.
pub fn parse_student_rows(rows: &[RawRow]) -> BulkOutcome<StudentRow> {
    validate_rows(rows, |row| {
        let mut values = require_all(row, &["name", "reg_no", "batch"])?.into_iter();
        let name = values.next().unwrap_or_default();
        let reg_no = values.next().unwrap_or_default();
        let batch = values.next().unwrap_or_default();
        Ok(StudentRow {
            name,
            reg_no,
            email: row.get("email").map(str::to_string),
            batch,
        })
    })
}

/// Study-plan rows require `program_code`, `course_code`, `semester`, and
/// both codes must resolve against the pre-fetched code→id maps.
pub fn parse_study_plan_rows(
    rows: &[RawRow],
    programs_by_code: &HashMap<String, i32>,
    courses_by_code: &HashMap<String, i32>,
) -> BulkOutcome<StudyPlanRow> {
    validate_rows(rows, |row| {
        let mut values = require_all(row, &["program_code", "course_code", "semester"])?.into_iter();
        let program_code = values.next().unwrap_or_default();
        let course_code = values.next().unwrap_or_default();

        let program_id = *programs_by_code
            .get(&program_code)
            .ok_or_else(|| format!("unknown program code '{program_code}'"))?;
        let course_id = *courses_by_code
            .get(&course_code)
            .ok_or_else(|| format!("unknown course code '{course_code}'"))?;

        Ok(StudyPlanRow {
            program_id,
            course_id,
            semester: row.int_or("semester", DEFAULT_SEMESTER),
            course_type: row
                .get("course_type")
                .unwrap_or(DEFAULT_COURSE_TYPE)
                .to_string(),
        })
    })
}
