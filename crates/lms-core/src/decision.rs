use crate::error::{LmsError, Result};
use crate::types::Enrollment;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Restore,
    SkipByDate,
    SkipByExclusion,
}

/// Decide what to do with one deleted enrollment.
///
/// Rules apply in order: a record updated before `threshold` is skipped by
/// date; otherwise a record whose section is in `exclusions` is skipped by
/// exclusion; everything else is restored. Without a threshold no record is
/// ever skipped by date.
pub fn decide(
    record: &Enrollment,
    threshold: Option<&DateTime<Utc>>,
    exclusions: &BTreeSet<String>,
) -> Decision {
    if let Some(t) = threshold {
        if record.updated_at < *t {
            return Decision::SkipByDate;
        }
    }
    if exclusions.iter().any(|s| record.in_section(s)) {
        return Decision::SkipByExclusion;
    }
    Decision::Restore
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Operator-supplied predicates for a restore run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub threshold: Option<DateTime<Utc>>,
    pub exclusions: BTreeSet<String>,
}

impl Filter {
    /// Build from the raw `--after-date` and `--skip-sections` values.
    pub fn parse(after_date: Option<&str>, skip_sections: Option<&str>) -> Result<Self> {
        Ok(Self {
            threshold: after_date.map(parse_threshold).transpose()?,
            exclusions: skip_sections.map(parse_exclusions).unwrap_or_default(),
        })
    }

    pub fn decide(&self, record: &Enrollment) -> Decision {
        decide(record, self.threshold.as_ref(), &self.exclusions)
    }
}

/// Accepts RFC 3339 (`2024-08-21T00:00:00-05:00`) or a calendar date
/// (`2024-08-21`, read as midnight UTC).
pub fn parse_threshold(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| LmsError::InvalidTimestamp(raw.to_string()))
}

/// Split a comma-separated section list, dropping blanks.
pub fn parse_exclusions(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
