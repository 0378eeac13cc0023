//! Re-enrollment driven by an exported enrollment file.
//!
//! Unlike [`crate::restore`], nothing is read from the remote service: the
//! section, user and role come straight from the CSV row.

use crate::client::LmsApi;
use crate::error::LmsError;
use crate::input::EnrollmentRow;
use crate::report::Reporter;
use crate::types::EnrollmentRequest;

/// Post one enrollment per row belonging to each user, users in input order.
///
/// `api` may be `None` only for a dry run; a live run without a client
/// reports every row as failed.
pub fn enroll_from_rows<A: LmsApi + ?Sized, R: Reporter + ?Sized>(
    api: Option<&A>,
    users: &[String],
    rows: &[EnrollmentRow],
    dry_run: bool,
    reporter: &R,
) {
    if users.is_empty() || rows.is_empty() {
        reporter.warn("No users or enrollments to process.");
        return;
    }
    reporter.info(&format!(
        "Starting to process {} users for enrollment.",
        users.len()
    ));

    for user_id in users {
        for row in rows.iter().filter(|r| &r.user_id == user_id) {
            let section = row.canvas_section_id;
            let role = &row.base_role_type;
            if dry_run {
                reporter.info(&format!(
                    "Dry run: Would enroll user {user_id} in section {section} with type {role}"
                ));
                continue;
            }

            reporter.info(&format!("Enrolling user {user_id} in section {section}"));
            let request = EnrollmentRequest {
                user_id: row.canvas_user_id.clone(),
                enrollment_type: role.clone(),
                enrollment_state: EnrollmentRequest::ACTIVE.to_string(),
                start_at: None,
                end_at: None,
            };
            let result = match api {
                Some(api) => api.enroll_in_section(section, &request),
                None => Err(LmsError::Configuration(
                    "no API client configured for a live run".to_string(),
                )),
            };
            match result {
                Ok(()) => reporter.info(&format!(
                    "Successfully enrolled user {user_id} in section {section}."
                )),
                Err(LmsError::RemoteRejected { status, .. }) => reporter.error(&format!(
                    "Failed to enroll user {user_id} in section {section}. Response code: {status}"
                )),
                Err(e) => reporter.error(&format!(
                    "Failed to enroll user {user_id} in section {section}: {e}"
                )),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
