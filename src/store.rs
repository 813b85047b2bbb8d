use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{
    AcademicRecord, Category, Experience, FamilyInfo, FullName, Qualification, Record, Remark,
    RemarkAuthor, STATUS_ACTIVE, STATUS_DELETED, STATUS_PAUSED, STUDENT_ROLE,
};
use crate::password::{self, PasswordError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("sub-document error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("password error: {0}")]
    Password(#[from] PasswordError),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Invalid { .. } | Self::Password(PasswordError::Empty) => "bad_params",
            Self::Sqlite(_) => "db_query_failed",
            Self::Json(_) => "db_json_failed",
            Self::Password(_) => "password_failed",
        }
    }

    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The slice of the store the correspondence screen talks to.
pub trait RecordStore {
    fn list_records(&self, category: Category) -> StoreResult<Vec<Record>>;

    /// Returns the store's acknowledgement; `false` means the store
    /// declined the note without raising an error.
    fn append_remark(&self, record_id: &str, text: &str, author: &RemarkAuthor)
        -> StoreResult<bool>;

    fn list_remarks(&self, record_id: &str) -> StoreResult<Vec<Remark>>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub full_name: FullName,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub cnic: Option<String>,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub enquiry_level: Option<i64>,
    #[serde(default)]
    pub prospectus_stage: Option<i64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub is_approved: Option<bool>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub family_info: Option<FamilyInfo>,
    #[serde(default)]
    pub academic_records: Option<AcademicRecord>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<FullName>,
    pub status: Option<i64>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub program: Option<String>,
    pub enquiry_level: Option<i64>,
    pub prospectus_stage: Option<i64>,
    pub level: Option<i64>,
    pub is_approved: Option<bool>,
    pub is_active: Option<bool>,
    pub is_suspended: Option<bool>,
    pub qualifications: Option<Vec<Qualification>>,
    pub experiences: Option<Vec<Experience>>,
    pub family_info: Option<FamilyInfo>,
    pub academic_records: Option<AcademicRecord>,
}

const RECORD_COLUMNS: &str = "id, user_name, email, first_name, last_name, role, status,
    phone_number, address, program, gender, cnic, father_name,
    enquiry_level, prospectus_stage, level, is_approved, is_active, is_suspended,
    qualifications_json, experiences_json, family_info_json, academic_records_json,
    created_on, updated_on";

fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(field: &'static str, s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::invalid(field, e.to_string()))
}

fn parse_json<T: DeserializeOwned + Default>(raw: Option<String>) -> StoreResult<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(s) => Ok(serde_json::from_str(s)?),
    }
}

fn parse_json_opt<T: DeserializeOwned>(raw: Option<String>) -> StoreResult<Option<T>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(s) => Ok(Some(serde_json::from_str(s)?)),
    }
}

fn validate_level(field: &'static str, v: Option<i64>) -> StoreResult<()> {
    match v {
        Some(n) if !(1..=6).contains(&n) => {
            Err(StoreError::invalid(field, format!("{n} is outside 1..=6")))
        }
        _ => Ok(()),
    }
}

fn validate_text(field: &'static str, v: &str) -> StoreResult<String> {
    let t = v.trim();
    if t.is_empty() {
        return Err(StoreError::invalid(field, "must not be empty"));
    }
    Ok(t.to_string())
}

fn map_write_err(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, msg) if f.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(msg.clone().unwrap_or_else(|| "unique constraint".into()))
        }
        _ => StoreError::Sqlite(e),
    }
}

struct RawRecord {
    id: String,
    user_name: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    status: i64,
    phone_number: Option<String>,
    address: Option<String>,
    program: Option<String>,
    gender: Option<String>,
    cnic: Option<String>,
    father_name: Option<String>,
    enquiry_level: Option<i64>,
    prospectus_stage: Option<i64>,
    level: Option<i64>,
    is_approved: Option<i64>,
    is_active: i64,
    is_suspended: i64,
    qualifications_json: Option<String>,
    experiences_json: Option<String>,
    family_info_json: Option<String>,
    academic_records_json: Option<String>,
    created_on: String,
    updated_on: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_name: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            role: row.get(5)?,
            status: row.get(6)?,
            phone_number: row.get(7)?,
            address: row.get(8)?,
            program: row.get(9)?,
            gender: row.get(10)?,
            cnic: row.get(11)?,
            father_name: row.get(12)?,
            enquiry_level: row.get(13)?,
            prospectus_stage: row.get(14)?,
            level: row.get(15)?,
            is_approved: row.get(16)?,
            is_active: row.get(17)?,
            is_suspended: row.get(18)?,
            qualifications_json: row.get(19)?,
            experiences_json: row.get(20)?,
            family_info_json: row.get(21)?,
            academic_records_json: row.get(22)?,
            created_on: row.get(23)?,
            updated_on: row.get(24)?,
        })
    }

    fn into_record(self) -> StoreResult<Record> {
        Ok(Record {
            id: self.id,
            user_name: self.user_name,
            email: self.email,
            full_name: FullName {
                first_name: self.first_name,
                last_name: self.last_name,
            },
            role: self.role,
            status: self.status,
            phone_number: self.phone_number,
            address: self.address,
            program: self.program,
            gender: self.gender,
            cnic: self.cnic,
            father_name: self.father_name,
            enquiry_level: self.enquiry_level,
            prospectus_stage: self.prospectus_stage,
            level: self.level,
            is_approved: self.is_approved.map(|v| v != 0),
            is_active: self.is_active != 0,
            is_suspended: self.is_suspended != 0,
            qualifications: parse_json(self.qualifications_json)?,
            experiences: parse_json(self.experiences_json)?,
            family_info: parse_json_opt(self.family_info_json)?,
            academic_records: parse_json_opt(self.academic_records_json)?,
            created_on: Some(parse_time("createdOn", &self.created_on)?),
            updated_on: Some(parse_time("updatedOn", &self.updated_on)?),
        })
    }
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
    password_rounds: u32,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection, password_rounds: u32) -> Self {
        Self {
            conn,
            password_rounds,
        }
    }

    pub fn get_record(&self, id: &str) -> StoreResult<Record> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE id = ? AND deleted_at IS NULL"
        );
        let raw = self
            .conn
            .query_row(&sql, [id], RawRecord::from_row)
            .optional()?
            .ok_or(StoreError::NotFound("record"))?;
        raw.into_record()
    }

    fn password_hash(&self, id: &str) -> StoreResult<String> {
        self.conn
            .query_row(
                "SELECT password_hash FROM records WHERE id = ? AND deleted_at IS NULL",
                [id],
                |r| r.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound("record"))
    }

    pub fn verify_password(&self, id: &str, candidate: &str) -> StoreResult<bool> {
        let hash = self.password_hash(id)?;
        Ok(password::verify_password(candidate, &hash)?)
    }

    pub fn create_record(&self, new: NewRecord) -> StoreResult<Record> {
        let user_name = validate_text("userName", &new.user_name)?;
        let email = validate_text("email", &new.email)?;
        let first_name = validate_text("fullName.firstName", &new.full_name.first_name)?;
        let last_name = validate_text("fullName.lastName", &new.full_name.last_name)?;
        let role = match new.role.as_deref() {
            Some(r) => validate_text("role", r)?,
            None => STUDENT_ROLE.to_string(),
        };
        validate_level("enquiryLevel", new.enquiry_level)?;
        validate_level("prospectusStage", new.prospectus_stage)?;
        validate_level("level", new.level)?;

        let password_hash = password::hash_password(&new.password, self.password_rounds)?;
        let id = Uuid::new_v4().to_string();
        let now = now_text();

        self.conn
            .execute(
                "INSERT INTO records(
                    id, user_name, email, password_hash, first_name, last_name, role, status,
                    phone_number, address, program, gender, cnic, father_name,
                    enquiry_level, prospectus_stage, level, is_approved, is_active, is_suspended,
                    qualifications_json, experiences_json, family_info_json, academic_records_json,
                    created_on, updated_on)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?, ?, ?, ?, ?)",
                params![
                    id,
                    user_name,
                    email,
                    password_hash,
                    first_name,
                    last_name,
                    role,
                    STATUS_ACTIVE,
                    new.phone_number,
                    new.address,
                    new.program,
                    new.gender,
                    new.cnic,
                    new.father_name,
                    new.enquiry_level,
                    new.prospectus_stage,
                    new.level,
                    new.is_approved.unwrap_or(false),
                    serde_json::to_string(&new.qualifications)?,
                    serde_json::to_string(&new.experiences)?,
                    serde_json::to_string(&new.family_info)?,
                    serde_json::to_string(&new.academic_records)?,
                    now,
                    now,
                ],
            )
            .map_err(map_write_err)?;

        info!(record_id = %id, role = %role, "created record");
        self.get_record(&id)
    }

    pub fn update_record(&self, id: &str, patch: RecordPatch) -> StoreResult<Record> {
        let mut rec = self.get_record(id)?;

        if let Some(email) = patch.email.as_deref() {
            rec.email = validate_text("email", email)?;
        }
        if let Some(name) = patch.full_name {
            rec.full_name = FullName {
                first_name: validate_text("fullName.firstName", &name.first_name)?,
                last_name: validate_text("fullName.lastName", &name.last_name)?,
            };
        }
        if let Some(status) = patch.status {
            // Deletion also stamps `deleted_at`; it only happens through
            // `delete_record`.
            if status == STATUS_DELETED {
                return Err(StoreError::invalid(
                    "status",
                    "status 3 is set by deleting the record",
                ));
            }
            if !(STATUS_ACTIVE..=STATUS_PAUSED).contains(&status) {
                return Err(StoreError::invalid("status", format!("{status} is not 1 or 2")));
            }
            rec.status = status;
        }
        validate_level("enquiryLevel", patch.enquiry_level)?;
        validate_level("prospectusStage", patch.prospectus_stage)?;
        validate_level("level", patch.level)?;
        rec.enquiry_level = patch.enquiry_level.or(rec.enquiry_level);
        rec.prospectus_stage = patch.prospectus_stage.or(rec.prospectus_stage);
        rec.level = patch.level.or(rec.level);
        rec.phone_number = patch.phone_number.or(rec.phone_number);
        rec.address = patch.address.or(rec.address);
        rec.program = patch.program.or(rec.program);
        rec.is_approved = patch.is_approved.or(rec.is_approved);
        rec.is_active = patch.is_active.unwrap_or(rec.is_active);
        rec.is_suspended = patch.is_suspended.unwrap_or(rec.is_suspended);
        if let Some(q) = patch.qualifications {
            rec.qualifications = q;
        }
        if let Some(x) = patch.experiences {
            rec.experiences = x;
        }
        if patch.family_info.is_some() {
            rec.family_info = patch.family_info;
        }
        if patch.academic_records.is_some() {
            rec.academic_records = patch.academic_records;
        }

        // Only a newly supplied password is hashed; the stored hash is
        // otherwise left untouched.
        let password_hash = match patch.password.as_deref() {
            Some(p) => password::hash_password(p, self.password_rounds)?,
            None => self.password_hash(id)?,
        };

        self.conn
            .execute(
                "UPDATE records SET
                    email = ?, password_hash = ?, first_name = ?, last_name = ?, status = ?,
                    phone_number = ?, address = ?, program = ?,
                    enquiry_level = ?, prospectus_stage = ?, level = ?,
                    is_approved = ?, is_active = ?, is_suspended = ?,
                    qualifications_json = ?, experiences_json = ?,
                    family_info_json = ?, academic_records_json = ?,
                    updated_on = ?
                 WHERE id = ?",
                params![
                    rec.email,
                    password_hash,
                    rec.full_name.first_name,
                    rec.full_name.last_name,
                    rec.status,
                    rec.phone_number,
                    rec.address,
                    rec.program,
                    rec.enquiry_level,
                    rec.prospectus_stage,
                    rec.level,
                    rec.is_approved,
                    rec.is_active,
                    rec.is_suspended,
                    serde_json::to_string(&rec.qualifications)?,
                    serde_json::to_string(&rec.experiences)?,
                    serde_json::to_string(&rec.family_info)?,
                    serde_json::to_string(&rec.academic_records)?,
                    now_text(),
                    id,
                ],
            )
            .map_err(map_write_err)?;

        info!(record_id = %id, "updated record");
        self.get_record(id)
    }

    /// Soft delete. The row and its remarks stay for audit.
    pub fn delete_record(&self, id: &str) -> StoreResult<()> {
        let now = now_text();
        let changed = self.conn.execute(
            "UPDATE records SET deleted_at = ?, status = ?, updated_on = ?
             WHERE id = ? AND deleted_at IS NULL",
            params![now, STATUS_DELETED, now, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("record"));
        }
        info!(record_id = %id, "deleted record");
        Ok(())
    }

    fn record_exists(&self, id: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE id = ? AND deleted_at IS NULL",
                [id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl RecordStore for SqliteStore<'_> {
    fn list_records(&self, category: Category) -> StoreResult<Vec<Record>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records
             WHERE role = ? AND deleted_at IS NULL
             ORDER BY created_on, rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let raws = stmt
            .query_map([STUDENT_ROLE], RawRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
            let rec = raw.into_record()?;
            if category == Category::Student && !rec.is_student_eligible() {
                continue;
            }
            out.push(rec);
        }
        debug!(category = category.as_str(), count = out.len(), "listed records");
        Ok(out)
    }

    fn append_remark(
        &self,
        record_id: &str,
        text: &str,
        author: &RemarkAuthor,
    ) -> StoreResult<bool> {
        let remark = validate_text("remark", text)?;
        if !self.record_exists(record_id)? {
            return Err(StoreError::NotFound("record"));
        }
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO remarks(id, record_id, remark, author_id, author_name, created_at)
                 VALUES(?, ?, ?, ?, ?, ?)",
                params![id, record_id, remark, author.id, author.name, now_text()],
            )
            .map_err(map_write_err)?;
        info!(record_id = %record_id, remark_id = %id, "appended remark");
        Ok(true)
    }

    fn list_remarks(&self, record_id: &str) -> StoreResult<Vec<Remark>> {
        if !self.record_exists(record_id)? {
            return Err(StoreError::NotFound("record"));
        }
        let mut stmt = self.conn.prepare(
            "SELECT id, record_id, remark, author_id, author_name, created_at
             FROM remarks
             WHERE record_id = ?
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map([record_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, record_id, remark, author_id, author_name, created_at)| {
                Ok(Remark {
                    id,
                    record_id,
                    remark,
                    author: RemarkAuthor {
                        id: author_id,
                        name: author_name,
                    },
                    created_at: parse_time("createdAt", &created_at)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::password::MIN_ROUNDS;
    use serde_json::json;

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        db::init_schema(&conn).expect("schema");
        conn
    }

    fn new_record(user: &str, first: &str, last: &str) -> NewRecord {
        serde_json::from_value(json!({
            "userName": user,
            "email": format!("{user}@school.test"),
            "password": "pw-123",
            "fullName": { "firstName": first, "lastName": last },
        }))
        .expect("new record")
    }

    #[test]
    fn create_defaults_and_hashes_password() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("ayesha", "Ayesha", "Malik"))
            .expect("create");
        assert_eq!(rec.role, STUDENT_ROLE);
        assert_eq!(rec.is_approved, Some(false));
        assert!(rec.is_active);
        assert_eq!(rec.resolved_level(), 1);

        let hash: String = conn
            .query_row(
                "SELECT password_hash FROM records WHERE id = ?",
                [&rec.id],
                |r| r.get(0),
            )
            .expect("hash row");
        assert_ne!(hash, "pw-123");
        assert!(store.verify_password(&rec.id, "pw-123").expect("verify"));
        assert!(!store.verify_password(&rec.id, "nope").expect("verify"));
    }

    #[test]
    fn duplicate_user_name_is_a_conflict() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        store
            .create_record(new_record("dup", "A", "B"))
            .expect("first");
        let mut second = new_record("dup", "C", "D");
        second.email = "other@school.test".into();
        let err = store.create_record(second).expect_err("conflict");
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn create_rejects_out_of_range_level() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let mut rec = new_record("lvl", "A", "B");
        rec.enquiry_level = Some(9);
        let err = store.create_record(rec).expect_err("invalid");
        assert_eq!(err.code(), "bad_params");
    }

    #[test]
    fn student_category_filters_inside_the_store() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let pending = store
            .create_record(new_record("p", "Pending", "One"))
            .expect("create");
        let approved = store
            .create_record(new_record("a", "Approved", "Two"))
            .expect("create");
        store
            .update_record(
                &approved.id,
                RecordPatch {
                    is_approved: Some(true),
                    ..RecordPatch::default()
                },
            )
            .expect("approve");
        let mut staff = new_record("t", "Teacher", "Three");
        staff.role = Some("Teacher".into());
        store.create_record(staff).expect("create staff");

        let enquiries = store.list_records(Category::Enquiry).expect("list");
        let ids: Vec<_> = enquiries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![pending.id.as_str(), approved.id.as_str()]);

        let students = store.list_records(Category::Student).expect("list");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, approved.id);
    }

    #[test]
    fn unapproved_flag_missing_counts_as_eligible() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("legacy", "Legacy", "Row"))
            .expect("create");
        conn.execute("UPDATE records SET is_approved = NULL WHERE id = ?", [&rec.id])
            .expect("null flag");
        let students = store.list_records(Category::Student).expect("list");
        assert_eq!(students.len(), 1);
    }

    #[test]
    fn update_merges_subdocuments_and_keeps_password() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("u", "Usman", "Ali"))
            .expect("create");
        let patch: RecordPatch = serde_json::from_value(json!({
            "prospectusStage": 3,
            "familyInfo": {
                "fatherName": "Ali Raza",
                "emergencyContact": { "name": "Sana", "phone": "0300" }
            },
            "qualifications": [{ "degree": "Matric", "year": "2024" }]
        }))
        .expect("patch");
        let updated = store.update_record(&rec.id, patch).expect("update");
        assert_eq!(updated.resolved_level(), 3);
        assert_eq!(
            updated
                .family_info
                .as_ref()
                .and_then(|f| f.emergency_contact.as_ref())
                .and_then(|c| c.name.as_deref()),
            Some("Sana")
        );
        assert_eq!(updated.qualifications.len(), 1);
        assert!(store.verify_password(&rec.id, "pw-123").expect("verify"));

        let repw = RecordPatch {
            password: Some("new-pw".into()),
            ..RecordPatch::default()
        };
        store.update_record(&rec.id, repw).expect("password change");
        assert!(store.verify_password(&rec.id, "new-pw").expect("verify"));
    }

    #[test]
    fn deleted_records_disappear() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("d", "Dana", "X"))
            .expect("create");
        store.delete_record(&rec.id).expect("delete");
        assert_eq!(
            store.get_record(&rec.id).expect_err("gone").code(),
            "not_found"
        );
        assert!(store.list_records(Category::Enquiry).expect("list").is_empty());
        assert_eq!(
            store.delete_record(&rec.id).expect_err("twice").code(),
            "not_found"
        );
    }

    #[test]
    fn deleted_status_cannot_be_patched_in() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("s", "Saba", "Q"))
            .expect("create");
        store
            .update_record(
                &rec.id,
                RecordPatch {
                    is_approved: Some(true),
                    ..RecordPatch::default()
                },
            )
            .expect("approve");

        let err = store
            .update_record(
                &rec.id,
                RecordPatch {
                    status: Some(STATUS_DELETED),
                    ..RecordPatch::default()
                },
            )
            .expect_err("deleted via patch");
        assert_eq!(err.code(), "bad_params");
        assert_eq!(store.get_record(&rec.id).expect("still live").status, STATUS_ACTIVE);

        let paused = store
            .update_record(
                &rec.id,
                RecordPatch {
                    status: Some(STATUS_PAUSED),
                    ..RecordPatch::default()
                },
            )
            .expect("pause");
        assert_eq!(paused.status, STATUS_PAUSED);
        assert_eq!(store.list_records(Category::Enquiry).expect("list").len(), 1);

        store.delete_record(&rec.id).expect("delete");
        assert!(store.list_records(Category::Enquiry).expect("list").is_empty());
        assert!(store.list_records(Category::Student).expect("list").is_empty());
        assert_eq!(
            store
                .append_remark(&rec.id, "late note", &RemarkAuthor::default())
                .expect_err("gone")
                .code(),
            "not_found"
        );
    }

    #[test]
    fn remarks_append_and_list_in_creation_order() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("r", "Rida", "Y"))
            .expect("create");
        let author = RemarkAuthor {
            id: Some("desk-1".into()),
            name: Some("Front Desk".into()),
        };
        assert!(store.append_remark(&rec.id, "  called parent  ", &author).expect("add"));
        assert!(store
            .append_remark(&rec.id, "sent prospectus", &RemarkAuthor::default())
            .expect("add"));

        let remarks = store.list_remarks(&rec.id).expect("list");
        assert_eq!(remarks.len(), 2);
        assert_eq!(remarks[0].remark, "called parent");
        assert_eq!(remarks[0].author.name.as_deref(), Some("Front Desk"));
        assert_eq!(remarks[1].remark, "sent prospectus");
        assert!(remarks[0].created_at <= remarks[1].created_at);
    }

    #[test]
    fn remark_validation() {
        let conn = mem_conn();
        let store = SqliteStore::new(&conn, MIN_ROUNDS);
        let rec = store
            .create_record(new_record("v", "Vee", "Z"))
            .expect("create");
        let empty = store
            .append_remark(&rec.id, "   ", &RemarkAuthor::default())
            .expect_err("empty");
        assert_eq!(empty.code(), "bad_params");
        let missing = store
            .append_remark("no-such-id", "hello", &RemarkAuthor::default())
            .expect_err("missing");
        assert_eq!(missing.code(), "not_found");
        assert_eq!(
            store.list_remarks("no-such-id").expect_err("missing").code(),
            "not_found"
        );
    }
}
