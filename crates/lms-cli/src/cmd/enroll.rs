use anyhow::Context;
use lms_core::enroll::enroll_from_rows;
use lms_core::input::{read_enrollment_rows, read_subjects, DELETED};
use lms_core::{HttpClient, TracingReporter};
use std::collections::HashSet;
use std::path::Path;

pub fn run(users_file: &Path, enrollments_file: &Path, dry_run: bool) -> anyhow::Result<()> {
    // A dry run never reaches the API, so it runs without credentials.
    let client = if dry_run {
        None
    } else {
        Some(super::connect()?)
    };

    let users = read_subjects(users_file, Some(DELETED)).context("failed to read users file")?;
    tracing::info!("Found {} users marked as deleted.", users.len());

    let keep: HashSet<String> = users.iter().cloned().collect();
    let rows = read_enrollment_rows(enrollments_file, &keep)
        .context("failed to read enrollments file")?;
    tracing::info!(
        "Retained {} relevant enrollments from the enrollment file.",
        rows.len()
    );

    enroll_from_rows::<HttpClient, _>(client.as_ref(), &users, &rows, dry_run, &TracingReporter);
    Ok(())
}
