use anyhow::Context;
use lms_core::input::read_course_records;
use lms_core::rename::{rename_courses, Substitution};
use lms_core::TracingReporter;
use std::path::Path;

pub fn run(json_file: &Path, from: String, to: String, dry_run: bool) -> anyhow::Result<()> {
    if from.is_empty() {
        anyhow::bail!("--from must not be empty");
    }
    let client = super::connect()?;
    let courses = read_course_records(json_file).context("failed to read course file")?;

    let sub = Substitution { from, to };
    rename_courses(&client, &courses, &sub, dry_run, &TracingReporter);
    Ok(())
}
