//! In-memory [`LmsApi`] used by unit tests. Records every mutating call.

use crate::client::{LmsApi, Records};
use crate::error::{LmsError, Result};
use crate::types::{
    CommunicationChannel, Course, Enrollment, EnrollmentRequest, Group, Section, User,
};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enroll(u64, EnrollmentRequest),
    UpdateCourse(u64, String, String),
    UpdateSection(u64, String),
}

#[derive(Default)]
pub struct FakeApi {
    pub enrollments: HashMap<String, Vec<Enrollment>>,
    pub sections: HashMap<u64, Section>,
    pub users: HashMap<String, User>,
    pub channels: HashMap<u64, Vec<CommunicationChannel>>,
    pub courses: HashMap<u64, Vec<Course>>,
    pub groups: HashMap<u64, Vec<Group>>,
    pub group_users: HashMap<u64, Vec<User>>,
    pub course_sections: HashMap<u64, Vec<Section>>,
    /// Subjects whose enrollment listing fails with a transport error.
    pub unreachable_subjects: HashSet<String>,
    /// Sections whose enroll call is rejected.
    pub rejecting_sections: HashSet<u64>,
    /// Courses whose update is rejected.
    pub rejecting_courses: HashSet<u64>,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeApi {
    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

fn records<'a, T: Clone + 'a>(items: Option<&'a Vec<T>>) -> Records<'a, T> {
    Box::new(items.into_iter().flatten().cloned().map(Ok))
}

fn rejected(url: String) -> LmsError {
    LmsError::RemoteRejected {
        status: 400,
        url,
        body: "rejected".to_string(),
    }
}

impl LmsApi for FakeApi {
    fn list_user_enrollments(&self, sis_user_id: &str, _state: &str) -> Records<'_, Enrollment> {
        if self.unreachable_subjects.contains(sis_user_id) {
            return Box::new(std::iter::once(Err(LmsError::RemoteUnavailable(
                "connection refused".to_string(),
            ))));
        }
        records(self.enrollments.get(sis_user_id))
    }

    fn get_section(&self, section_id: u64) -> Result<Section> {
        self.sections.get(&section_id).cloned().ok_or_else(|| LmsError::RemoteRejected {
            status: 404,
            url: format!("sections/{section_id}"),
            body: "not found".to_string(),
        })
    }

    fn enroll_in_section(&self, section_id: u64, request: &EnrollmentRequest) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Enroll(section_id, request.clone()));
        if self.rejecting_sections.contains(&section_id) {
            return Err(rejected(format!("sections/{section_id}/enrollments")));
        }
        Ok(())
    }

    fn get_user_by_sis_id(&self, sis_user_id: &str) -> Result<User> {
        self.users
            .get(sis_user_id)
            .cloned()
            .ok_or_else(|| LmsError::RemoteUnavailable(format!("no route to user {sis_user_id}")))
    }

    fn list_communication_channels(&self, user_id: u64) -> Records<'_, CommunicationChannel> {
        records(self.channels.get(&user_id))
    }

    fn list_user_courses(&self, user_id: u64) -> Records<'_, Course> {
        records(self.courses.get(&user_id))
    }

    fn list_course_groups(&self, course_id: u64) -> Records<'_, Group> {
        records(self.groups.get(&course_id))
    }

    fn list_group_users(&self, group_id: u64) -> Records<'_, User> {
        records(self.group_users.get(&group_id))
    }

    fn list_course_sections(&self, course_id: u64) -> Records<'_, Section> {
        records(self.course_sections.get(&course_id))
    }

    fn update_course(&self, course_id: u64, name: &str, course_code: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::UpdateCourse(
            course_id,
            name.to_string(),
            course_code.to_string(),
        ));
        if self.rejecting_courses.contains(&course_id) {
            return Err(rejected(format!("courses/{course_id}")));
        }
        Ok(())
    }

    fn update_section(&self, section_id: u64, name: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateSection(section_id, name.to_string()));
        Ok(())
    }
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

/// A deleted student enrollment in section 412 (`S1`).
pub fn deleted_enrollment(id: u64, updated_at: &str) -> Enrollment {
    Enrollment {
        id,
        user_id: 77,
        course_id: 310,
        course_section_id: 412,
        sis_section_id: Some("S1".to_string()),
        enrollment_type: "StudentEnrollment".to_string(),
        enrollment_state: "deleted".to_string(),
        updated_at: ts(updated_at),
        start_at: None,
        end_at: None,
        user: None,
    }
}

pub fn section(id: u64, name: &str) -> Section {
    Section {
        id,
        name: name.to_string(),
        course_id: Some(310),
        sis_section_id: None,
    }
}
