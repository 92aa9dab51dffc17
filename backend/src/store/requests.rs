//! Quote requests and their status trail.
//!
//! Log rows are only ever inserted here; there is no statement that edits or
//! removes one outside the cascade from their request.

use super::{decimal_column, decimal_to_sql, enum_column, expect_changed, StoreError};
use chrono::Utc;
use common::model::custom_request::{
    reference_code, CustomRequest, RequestStatus, RequestStatusLog,
};
use common::requests::custom_request::CustomRequestInput;
use rusqlite::{params, Connection, Row};

const REFERENCE_ATTEMPTS: usize = 10;

const REQUEST_COLUMNS: &str = "id, reference_code, contact_name, company_name, email, phone, \
    industry_id, machine_type, capacity_requirement, budget_min, budget_max, currency, \
    project_location, deployment_timeline, description, attachment, preferred_contact_method, \
    status, internal_notes, created_at, updated_at";

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<CustomRequest> {
    Ok(CustomRequest {
        id: row.get(0)?,
        reference_code: row.get(1)?,
        contact_name: row.get(2)?,
        company_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        industry_id: row.get(6)?,
        machine_type: row.get(7)?,
        capacity_requirement: row.get(8)?,
        budget_min: decimal_column(row, 9)?,
        budget_max: decimal_column(row, 10)?,
        currency: row.get(11)?,
        project_location: row.get(12)?,
        deployment_timeline: row.get(13)?,
        description: row.get(14)?,
        attachment: row.get(15)?,
        preferred_contact_method: row.get(16)?,
        status: enum_column(row, 17)?,
        internal_notes: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<RequestStatusLog> {
    Ok(RequestStatusLog {
        id: row.get(0)?,
        request_id: row.get(1)?,
        status: enum_column(row, 2)?,
        comment: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn reference_exists(conn: &Connection, code: &str) -> Result<bool, StoreError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM custom_requests WHERE reference_code = ?1)",
        params![code],
        |row| row.get(0),
    )?)
}

/// A reference code no stored request uses yet.
pub fn unique_reference(conn: &Connection) -> Result<String, StoreError> {
    for _ in 0..REFERENCE_ATTEMPTS {
        let code = reference_code(Utc::now());
        if !reference_exists(conn, &code)? {
            return Ok(code);
        }
    }
    Err(StoreError::Conflict(
        "could not allocate a unique request reference".to_string(),
    ))
}

/// Stores a new request in the `new` status.
///
/// This does not touch the status trail; callers append the initial log row
/// in the same transaction.
pub fn insert_request(
    conn: &Connection,
    reference: &str,
    input: &CustomRequestInput,
    attachment: Option<&str>,
) -> Result<CustomRequest, StoreError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO custom_requests (reference_code, contact_name, company_name, email, phone,
            industry_id, machine_type, capacity_requirement, budget_min, budget_max, currency,
            project_location, deployment_timeline, description, attachment,
            preferred_contact_method, status, internal_notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
            '', ?18, ?19)",
        params![
            reference,
            input.contact_name,
            input.company_name,
            input.email,
            input.phone,
            input.industry_id,
            input.machine_type,
            input.capacity_requirement,
            decimal_to_sql(input.budget_min),
            decimal_to_sql(input.budget_max),
            input.currency,
            input.project_location,
            input.deployment_timeline,
            input.description,
            attachment,
            input.preferred_contact_method,
            RequestStatus::New.as_str(),
            now,
            now,
        ],
    )?;
    get_request(conn, conn.last_insert_rowid())
}

pub fn get_request(conn: &Connection, id: i64) -> Result<CustomRequest, StoreError> {
    let sql = format!("SELECT {} FROM custom_requests WHERE id = ?1", REQUEST_COLUMNS);
    Ok(conn.query_row(&sql, params![id], request_from_row)?)
}

/// Newest first, optionally narrowed to one status.
pub fn list_requests(
    conn: &Connection,
    status: Option<RequestStatus>,
) -> Result<Vec<CustomRequest>, StoreError> {
    let sql = format!(
        "SELECT {} FROM custom_requests WHERE ?1 IS NULL OR status = ?1
         ORDER BY created_at DESC, id DESC",
        REQUEST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![status.map(RequestStatus::as_str)], request_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Writes the operator-editable columns. Status logging is the caller's job.
pub fn update_request(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    internal_notes: &str,
) -> Result<CustomRequest, StoreError> {
    expect_changed(conn.execute(
        "UPDATE custom_requests SET status = ?2, internal_notes = ?3, updated_at = ?4
         WHERE id = ?1",
        params![id, status.as_str(), internal_notes, Utc::now()],
    )?)?;
    get_request(conn, id)
}

pub fn delete_request(conn: &Connection, id: i64) -> Result<(), StoreError> {
    expect_changed(conn.execute(
        "DELETE FROM custom_requests WHERE id = ?1",
        params![id],
    )?)
}

pub fn append_status_log(
    conn: &Connection,
    request_id: i64,
    status: RequestStatus,
    comment: &str,
) -> Result<RequestStatusLog, StoreError> {
    conn.execute(
        "INSERT INTO request_status_logs (request_id, status, comment, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![request_id, status.as_str(), comment, Utc::now()],
    )?;
    Ok(conn.query_row(
        "SELECT id, request_id, status, comment, created_at FROM request_status_logs
         WHERE id = ?1",
        params![conn.last_insert_rowid()],
        log_from_row,
    )?)
}

/// The trail of one request, newest first.
pub fn status_logs(conn: &Connection, request_id: i64) -> Result<Vec<RequestStatusLog>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, request_id, status, comment, created_at FROM request_status_logs
         WHERE request_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt
        .query_map(params![request_id], log_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
