use anyhow::Context;
use lms_core::backup::{backup_users, write_backup};
use lms_core::input::read_subjects;
use lms_core::TracingReporter;
use std::path::Path;

pub fn run(csv_file: &Path, output_file: &Path) -> anyhow::Result<()> {
    let client = super::connect()?;
    let subjects = read_subjects(csv_file, None).context("failed to read users file")?;

    let backups = backup_users(&client, &subjects, &TracingReporter);
    write_backup(output_file, &backups)
        .with_context(|| format!("failed to write {}", output_file.display()))?;
    tracing::info!(
        "Wrote {} of {} users to {}",
        backups.len(),
        subjects.len(),
        output_file.display()
    );
    Ok(())
}
