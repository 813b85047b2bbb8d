use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "campus.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS records(
            id TEXT PRIMARY KEY,
            user_name TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 1,
            phone_number TEXT,
            enquiry_level INTEGER,
            prospectus_stage INTEGER,
            level INTEGER,
            is_approved INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_suspended INTEGER NOT NULL DEFAULT 0,
            created_on TEXT NOT NULL,
            updated_on TEXT NOT NULL,
            deleted_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_role ON records(role)",
        [],
    )?;

    // Profile columns arrived after the first release; older workspaces
    // get them added in place.
    ensure_records_profile_columns(conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS remarks(
            id TEXT PRIMARY KEY,
            record_id TEXT NOT NULL,
            remark TEXT NOT NULL,
            author_id TEXT,
            author_name TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(record_id) REFERENCES records(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_remarks_record ON remarks(record_id, created_at)",
        [],
    )?;

    Ok(())
}

fn ensure_records_profile_columns(conn: &Connection) -> anyhow::Result<()> {
    for column in [
        "address",
        "program",
        "gender",
        "cnic",
        "father_name",
        "qualifications_json",
        "experiences_json",
        "family_info_json",
        "academic_records_json",
    ] {
        if !table_has_column(conn, "records", column)? {
            conn.execute(
                &format!("ALTER TABLE records ADD COLUMN {column} TEXT"),
                [],
            )?;
        }
    }
    Ok(())
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
