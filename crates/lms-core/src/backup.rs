use crate::client::LmsApi;
use crate::error::Result;
use crate::io;
use crate::report::Reporter;
use crate::types::{GroupMembership, UserBackup, UserData};
use std::path::Path;

/// Collect communication channels and group memberships for one user.
pub fn user_data<A: LmsApi + ?Sized>(api: &A, sis_user_id: &str) -> Result<UserData> {
    let user = api.get_user_by_sis_id(sis_user_id)?;
    let communication_channels = api
        .list_communication_channels(user.id)
        .collect::<Result<Vec<_>>>()?;

    let mut groups = Vec::new();
    for course in api.list_user_courses(user.id) {
        let course = course?;
        for group in api.list_course_groups(course.id) {
            let group = group?;
            let mut is_member = false;
            for member in api.list_group_users(group.id) {
                if member?.id == user.id {
                    is_member = true;
                    break;
                }
            }
            if is_member {
                groups.push(GroupMembership {
                    course_id: course.id,
                    course_name: course.name.clone(),
                    group_id: group.id,
                    group_name: group.name,
                });
            }
        }
    }

    Ok(UserData {
        communication_channels,
        groups,
    })
}

/// Back up every subject in order. A subject whose lookups fail is reported
/// and left out of the result.
pub fn backup_users<A: LmsApi + ?Sized, R: Reporter + ?Sized>(
    api: &A,
    subjects: &[String],
    reporter: &R,
) -> Vec<UserBackup> {
    let mut backups = Vec::with_capacity(subjects.len());
    for subject in subjects {
        match user_data(api, subject) {
            Ok(data) => {
                reporter.info(&format!(
                    "Backed up user {subject}: {} communication channels, {} groups",
                    data.communication_channels.len(),
                    data.groups.len()
                ));
                backups.push(UserBackup {
                    user_id: subject.clone(),
                    data,
                });
            }
            Err(e) => reporter.error(&format!("Failed to back up user {subject}: {e}")),
        }
    }
    backups
}

pub fn write_backup(path: &Path, backups: &[UserBackup]) -> Result<()> {
    io::write_json(path, &backups)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
