//! Loaders for the operator-supplied CSV and JSON input files.

use crate::error::{LmsError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

pub const USER_ID: &str = "user_id";
pub const STATUS: &str = "status";
pub const DELETED: &str = "deleted";

// ---------------------------------------------------------------------------
// CSV plumbing
// ---------------------------------------------------------------------------

struct Table {
    headers: StringRecord,
    rows: Vec<(u64, StringRecord)>,
}

impl Table {
    fn read(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| LmsError::input(path, e.to_string()))?;
        let headers = reader
            .headers()
            .map_err(|e| LmsError::input(path, e.to_string()))?
            .clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| LmsError::input(path, e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push((line, record));
        }
        Ok(Self { headers, rows })
    }

    fn column(&self, path: &Path, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LmsError::input(path, format!("missing required column '{name}'")))
    }
}

fn field<'r>(
    path: &Path,
    line: u64,
    record: &'r StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str> {
    record
        .get(index)
        .ok_or_else(|| LmsError::input(path, format!("line {line}: no value for '{name}'")))
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// Read the `user_id` column in file order, duplicates preserved. With a
/// `status_filter`, only rows whose `status` equals it are kept.
pub fn read_subjects(path: &Path, status_filter: Option<&str>) -> Result<Vec<String>> {
    let table = Table::read(path)?;
    let user_col = table.column(path, USER_ID)?;
    let status_col = match status_filter {
        Some(_) => Some(table.column(path, STATUS)?),
        None => None,
    };

    let mut subjects = Vec::new();
    for (line, record) in &table.rows {
        if let (Some(want), Some(col)) = (status_filter, status_col) {
            if field(path, *line, record, col, STATUS)? != want {
                continue;
            }
        }
        subjects.push(field(path, *line, record, user_col, USER_ID)?.to_string());
    }
    Ok(subjects)
}

// ---------------------------------------------------------------------------
// Enrollment rows
// ---------------------------------------------------------------------------

/// One row of an enrollment export.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRow {
    pub user_id: String,
    pub canvas_section_id: u64,
    pub canvas_user_id: String,
    pub base_role_type: String,
}

/// Read an enrollment export, keeping rows whose `user_id` is in `keep`.
pub fn read_enrollment_rows(path: &Path, keep: &HashSet<String>) -> Result<Vec<EnrollmentRow>> {
    let table = Table::read(path)?;
    let user_col = table.column(path, USER_ID)?;
    let section_col = table.column(path, "canvas_section_id")?;
    let canvas_user_col = table.column(path, "canvas_user_id")?;
    let role_col = table.column(path, "base_role_type")?;

    let mut rows = Vec::new();
    for (line, record) in &table.rows {
        let user_id = field(path, *line, record, user_col, USER_ID)?;
        if !keep.contains(user_id) {
            continue;
        }
        let raw_section = field(path, *line, record, section_col, "canvas_section_id")?;
        let canvas_section_id = raw_section.parse::<u64>().map_err(|_| {
            LmsError::input(
                path,
                format!("line {line}: canvas_section_id '{raw_section}' is not a number"),
            )
        })?;
        rows.push(EnrollmentRow {
            user_id: user_id.to_string(),
            canvas_section_id,
            canvas_user_id: field(path, *line, record, canvas_user_col, "canvas_user_id")?
                .to_string(),
            base_role_type: field(path, *line, record, role_col, "base_role_type")?.to_string(),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Course records
// ---------------------------------------------------------------------------

/// A course as exported by `GET accounts/:id/courses`; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseRecord {
    pub id: u64,
    pub name: String,
    pub course_code: String,
}

pub fn read_course_records(path: &Path) -> Result<Vec<CourseRecord>> {
    let file = File::open(path).map_err(|e| LmsError::input(path, e.to_string()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| LmsError::input(path, e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
