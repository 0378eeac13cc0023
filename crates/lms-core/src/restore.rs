//! Restoration of deleted enrollments.
//!
//! For every subject in input order the [`Restorer`] lists the subject's
//! deleted enrollments, runs each through the [`Filter`], and re-activates
//! the ones that survive. A failure while listing abandons only that
//! subject; a failure while restoring abandons only that enrollment.

use crate::client::LmsApi;
use crate::decision::{Decision, Filter};
use crate::error::Result;
use crate::report::Reporter;
use crate::types::{Enrollment, EnrollmentRequest};
use std::fmt;

pub const DELETED_STATE: &str = "deleted";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreOptions {
    pub filter: Filter,
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Restored,
    WouldRestore,
    SkippedByDate,
    SkippedByExclusion,
}

impl Outcome {
    pub fn headline(self) -> &'static str {
        match self {
            Outcome::Restored => "Restoring enrollment",
            Outcome::WouldRestore => "(DRY-RUN) Restoring enrollment",
            Outcome::SkippedByDate => "Skipping because date filtered.",
            Outcome::SkippedByExclusion => "Skipping because skip section set.",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

/// Audit line for one enrollment: headline plus everything needed to find
/// the record again.
pub fn describe(outcome: Outcome, subject: &str, e: &Enrollment) -> String {
    let state = match outcome {
        Outcome::Restored => EnrollmentRequest::ACTIVE,
        _ => e.enrollment_state.as_str(),
    };
    let sis_import = e
        .sis_import_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{outcome} ENROLLMENT_ID: {} USER: {subject} COURSE_ID: {} UPDATED: {} TYPE: {} \
         COURSE_SECTION_ID: {} SIS_SECTION_ID: {} SIS_IMPORT_ID: {sis_import} ENROLLMENT_STATE: {state}",
        e.id,
        e.course_id,
        e.updated_at.to_rfc3339(),
        e.enrollment_type,
        e.course_section_id,
        e.sis_section_id.as_deref().unwrap_or("-"),
    )
}

// ---------------------------------------------------------------------------
// Restorer
// ---------------------------------------------------------------------------

pub struct Restorer<'a, A: LmsApi + ?Sized, R: Reporter + ?Sized> {
    api: &'a A,
    reporter: &'a R,
    options: RestoreOptions,
}

impl<'a, A: LmsApi + ?Sized, R: Reporter + ?Sized> Restorer<'a, A, R> {
    pub fn new(api: &'a A, reporter: &'a R, options: RestoreOptions) -> Self {
        Self {
            api,
            reporter,
            options,
        }
    }

    /// Process every subject in order. Remote failures are reported and
    /// skipped; nothing is returned because the report is the audit trail.
    pub fn run(&self, subjects: &[String]) {
        let filter = &self.options.filter;
        let after = filter
            .threshold
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "none".to_string());
        let skip: Vec<&str> = filter.exclusions.iter().map(String::as_str).collect();
        self.reporter.info(&format!(
            "Restoring deleted enrollments for {} users (after_date: {after}, skip_sections: [{}], dry_run: {})",
            subjects.len(),
            skip.join(","),
            self.options.dry_run,
        ));
        for subject in subjects {
            self.restore_subject(subject);
        }
    }

    pub fn restore_subject(&self, subject: &str) {
        self.reporter.info(&format!(
            "---- Retrieving deleted enrollments for user {subject}"
        ));
        for item in self.api.list_user_enrollments(subject, DELETED_STATE) {
            let enrollment = match item {
                Ok(e) => e,
                Err(e) => {
                    self.reporter
                        .error(&format!("Error fetching enrollments for user {subject}: {e}"));
                    return;
                }
            };
            match self.restore_enrollment(subject, &enrollment) {
                Ok(message) => self.reporter.info(&message),
                Err(e) => self.reporter.error(&format!(
                    "Failed to restore enrollment ID {} for user {subject}: {e}",
                    enrollment.id
                )),
            }
        }
    }

    /// Decide and, when warranted, re-enroll. Returns the audit line; an
    /// error means a remote call failed.
    pub fn restore_enrollment(&self, subject: &str, e: &Enrollment) -> Result<String> {
        let outcome = match self.options.filter.decide(e) {
            Decision::SkipByDate => Outcome::SkippedByDate,
            Decision::SkipByExclusion => Outcome::SkippedByExclusion,
            Decision::Restore => {
                let section = self.api.get_section(e.course_section_id)?;
                if self.options.dry_run {
                    self.reporter
                        .info(&format!("(DRY-RUN) Enrolling user in section {}", section.name));
                    Outcome::WouldRestore
                } else {
                    self.reporter
                        .info(&format!("Enrolling user in section {}", section.name));
                    self.api
                        .enroll_in_section(section.id, &EnrollmentRequest::restore(e))?;
                    Outcome::Restored
                }
            }
        };
        Ok(describe(outcome, subject, e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
