use crate::client::LmsApi;
use crate::error::Result;
use crate::input::CourseRecord;
use crate::report::Reporter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

impl Substitution {
    pub fn apply(&self, s: &str) -> String {
        s.replace(&self.from, &self.to)
    }
}

/// Rename one course and all of its sections. In a dry run the reads and
/// log lines happen but no update is sent.
pub fn rename_course<A: LmsApi + ?Sized, R: Reporter + ?Sized>(
    api: &A,
    course: &CourseRecord,
    sub: &Substitution,
    dry_run: bool,
    reporter: &R,
) -> Result<()> {
    let prefix = if dry_run { "(DRY-RUN) " } else { "" };
    let new_name = sub.apply(&course.name);
    let new_code = sub.apply(&course.course_code);
    if !dry_run {
        api.update_course(course.id, &new_name, &new_code)?;
    }
    reporter.info(&format!(
        "{prefix}Course ID {}: name {} updated to {new_name}, course_code {} updated to {new_code}",
        course.id, course.name, course.course_code
    ));

    for section in api.list_course_sections(course.id) {
        let section = section?;
        let new_section_name = sub.apply(&section.name);
        if !dry_run {
            api.update_section(section.id, &new_section_name)?;
        }
        reporter.info(&format!(
            "{prefix}Section ID {}: name {} updated to {new_section_name}",
            section.id, section.name
        ));
    }
    Ok(())
}

/// Rename every course in order; a failure is reported and the next course
/// proceeds.
pub fn rename_courses<A: LmsApi + ?Sized, R: Reporter + ?Sized>(
    api: &A,
    courses: &[CourseRecord],
    sub: &Substitution,
    dry_run: bool,
    reporter: &R,
) {
    reporter.info(&format!("Number of items in the course data: {}", courses.len()));
    for course in courses {
        if let Err(e) = rename_course(api, course, sub, dry_run, reporter) {
            reporter.error(&format!("Failed to rename course ID {}: {e}", course.id));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
