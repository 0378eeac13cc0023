use anyhow::Context;
use lms_core::input::read_subjects;
use lms_core::{Filter, RestoreOptions, Restorer, TracingReporter};
use std::path::Path;

pub fn run(
    csv_file: &Path,
    skip_sections: Option<&str>,
    after_date: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = super::connect()?;
    let filter = Filter::parse(after_date, skip_sections)?;
    let subjects = read_subjects(csv_file, None).context("failed to read users file")?;

    let options = RestoreOptions { filter, dry_run };
    Restorer::new(&client, &TracingReporter, options).run(&subjects);
    Ok(())
}
