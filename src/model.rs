use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: i64 = 1;
pub const STATUS_PAUSED: i64 = 2;
pub const STATUS_DELETED: i64 = 3;

pub const STUDENT_ROLE: &str = "Student";

/// Which collection the correspondence screen is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Enquiry,
    Student,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enquiry" => Some(Self::Enquiry),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enquiry => "enquiry",
            Self::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullName {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl FullName {
    pub fn display(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_usable(&self) -> bool {
        !self.first_name.trim().is_empty() || !self.last_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Qualification {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyInfo {
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub father_occupation_location: Option<String>,
    pub kinship: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicRecord {
    pub matric_marks: Option<String>,
    pub matric_roll_no: Option<String>,
    pub matric_year: Option<String>,
    pub matric_board: Option<String>,
    pub first_year_marks: Option<String>,
    pub second_year_marks: Option<String>,
}

/// A student or enquiry row as the store hands it out. The password hash
/// stays inside the store and never appears here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub full_name: FullName,
    pub role: String,
    pub status: i64,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub program: Option<String>,
    pub gender: Option<String>,
    pub cnic: Option<String>,
    pub father_name: Option<String>,
    pub enquiry_level: Option<i64>,
    pub prospectus_stage: Option<i64>,
    pub level: Option<i64>,
    pub is_approved: Option<bool>,
    pub is_active: bool,
    pub is_suspended: bool,
    pub qualifications: Vec<Qualification>,
    pub experiences: Vec<Experience>,
    pub family_info: Option<FamilyInfo>,
    pub academic_records: Option<AcademicRecord>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountStatus {
    Active,
    Paused,
    Pending,
}

impl Record {
    /// Funnel stage: first non-zero of enquiry level, prospectus stage,
    /// generic level; 1 when none is set.
    pub fn resolved_level(&self) -> i64 {
        [self.enquiry_level, self.prospectus_stage, self.level]
            .into_iter()
            .flatten()
            .find(|v| *v != 0)
            .unwrap_or(1)
    }

    /// Student view membership: a usable name and not explicitly unapproved.
    pub fn is_student_eligible(&self) -> bool {
        self.full_name.is_usable() && self.is_approved != Some(false)
    }

    pub fn display_name(&self) -> String {
        self.full_name.display().trim().to_string()
    }

    pub fn account_status(&self) -> AccountStatus {
        let approved = self.is_approved.unwrap_or(false);
        if self.status == STATUS_ACTIVE && self.is_active && approved {
            return AccountStatus::Active;
        }
        if self.status == STATUS_PAUSED || self.is_suspended || !self.is_active {
            return AccountStatus::Paused;
        }
        AccountStatus::Pending
    }
}

pub fn level_label(level: i64) -> String {
    let name = match level {
        1 => "Initial Enquiry",
        2 => "Follow-up",
        3 => "Serious Interest",
        4 => "Documents Submitted",
        5 => "Admitted Student",
        _ => return format!("Level {level}"),
    };
    format!("Level {level} - {name}")
}

/// Who wrote a remark. Front-desk staff are recorded by id and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkAuthor {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    pub id: String,
    pub record_id: String,
    pub remark: String,
    #[serde(default)]
    pub author: RemarkAuthor,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str, first: &str, level: Option<i64>) -> Record {
    Record {
        id: id.to_string(),
        user_name: id.to_string(),
        email: format!("{id}@example.com"),
        full_name: FullName {
            first_name: first.to_string(),
            last_name: String::new(),
        },
        role: STUDENT_ROLE.to_string(),
        status: STATUS_ACTIVE,
        phone_number: None,
        address: None,
        program: None,
        gender: None,
        cnic: None,
        father_name: None,
        enquiry_level: None,
        prospectus_stage: None,
        level,
        is_approved: None,
        is_active: true,
        is_suspended: false,
        qualifications: Vec::new(),
        experiences: Vec::new(),
        family_info: None,
        academic_records: None,
        created_on: None,
        updated_on: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_resolution_prefers_enquiry_then_prospectus_then_level() {
        let mut r = sample_record("a", "A", Some(2));
        assert_eq!(r.resolved_level(), 2);
        r.prospectus_stage = Some(4);
        assert_eq!(r.resolved_level(), 4);
        r.enquiry_level = Some(5);
        assert_eq!(r.resolved_level(), 5);
    }

    #[test]
    fn zero_levels_fall_through_to_default() {
        let mut r = sample_record("a", "A", None);
        assert_eq!(r.resolved_level(), 1);
        r.enquiry_level = Some(0);
        r.prospectus_stage = Some(0);
        r.level = Some(3);
        assert_eq!(r.resolved_level(), 3);
    }

    #[test]
    fn student_eligibility_needs_name_and_no_explicit_rejection() {
        let mut r = sample_record("a", "  ", None);
        assert!(!r.is_student_eligible());
        r.full_name.last_name = "Khan".into();
        assert!(r.is_student_eligible());
        r.is_approved = Some(true);
        assert!(r.is_student_eligible());
        r.is_approved = Some(false);
        assert!(!r.is_student_eligible());
    }

    #[test]
    fn account_status_follows_flags() {
        let mut r = sample_record("a", "A", None);
        assert_eq!(r.account_status(), AccountStatus::Pending);
        r.is_approved = Some(true);
        assert_eq!(r.account_status(), AccountStatus::Active);
        // Active wins over the suspension flag.
        r.is_suspended = true;
        assert_eq!(r.account_status(), AccountStatus::Active);
        r.is_approved = Some(false);
        assert_eq!(r.account_status(), AccountStatus::Paused);
        r.is_suspended = false;
        r.is_approved = Some(true);
        r.is_active = false;
        assert_eq!(r.account_status(), AccountStatus::Paused);
        r.is_active = true;
        r.status = STATUS_DELETED;
        assert_eq!(r.account_status(), AccountStatus::Pending);
    }

    #[test]
    fn account_status_serializes_pascal_case() {
        let r = sample_record("a", "A", None);
        assert_eq!(
            serde_json::to_value(r.account_status()).expect("serialize"),
            "Pending"
        );
    }

    #[test]
    fn level_labels() {
        assert_eq!(level_label(1), "Level 1 - Initial Enquiry");
        assert_eq!(level_label(5), "Level 5 - Admitted Student");
        assert_eq!(level_label(6), "Level 6");
    }

    #[test]
    fn record_serializes_camel_case_nested_name() {
        let r = sample_record("a", "Ali", Some(2));
        let v = serde_json::to_value(&r).expect("serialize");
        assert_eq!(v["fullName"]["firstName"], "Ali");
        assert_eq!(v["level"], 2);
        assert!(v.get("passwordHash").is_none());
    }
}
