use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

/// An enrollment as returned by `GET users/:id/enrollments`.
///
/// Only the fields the restore flow reads are declared; a response missing
/// any non-optional field fails to decode at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: u64,
    pub user_id: u64,
    pub course_id: u64,
    pub course_section_id: u64,
    #[serde(default)]
    pub sis_section_id: Option<String>,
    #[serde(rename = "type")]
    pub enrollment_type: String,
    pub enrollment_state: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub user: Option<EnrollmentUser>,
}

impl Enrollment {
    /// True if `section` names this enrollment's section, either by SIS id
    /// or by numeric section id.
    pub fn in_section(&self, section: &str) -> bool {
        self.sis_section_id.as_deref() == Some(section)
            || self.course_section_id.to_string() == section
    }

    pub fn sis_import_id(&self) -> Option<u64> {
        self.user.as_ref().and_then(|u| u.sis_import_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentUser {
    pub id: u64,
    #[serde(default)]
    pub sis_user_id: Option<String>,
    #[serde(default)]
    pub sis_import_id: Option<u64>,
}

/// Body of `POST sections/:id/enrollments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub enrollment_type: String,
    pub enrollment_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
}

impl EnrollmentRequest {
    pub const ACTIVE: &'static str = "active";

    /// Re-activate a previously deleted enrollment with its original type and dates.
    pub fn restore(e: &Enrollment) -> Self {
        Self {
            user_id: e.user_id.to_string(),
            enrollment_type: e.enrollment_type.clone(),
            enrollment_state: Self::ACTIVE.to_string(),
            start_at: e.start_at.clone(),
            end_at: e.end_at.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Section / Course
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub course_id: Option<u64>,
    #[serde(default)]
    pub sis_section_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_code: String,
}

// ---------------------------------------------------------------------------
// Users, channels, groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationChannel {
    pub id: u64,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub address: String,
    #[serde(default)]
    pub position: u32,
    pub user_id: u64,
    pub workflow_state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Backup output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub course_id: u64,
    pub course_name: String,
    pub group_id: u64,
    pub group_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub communication_channels: Vec<CommunicationChannel>,
    pub groups: Vec<GroupMembership>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBackup {
    pub user_id: String,
    pub data: UserData,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
