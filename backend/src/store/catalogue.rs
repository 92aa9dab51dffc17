//! Categories, industries and machines.

use super::{
    decimal_column, decimal_to_sql, enum_column, expect_changed, Resource, StoreError,
};
use chrono::Utc;
use common::forms::FieldErrors;
use common::model::catalogue::{
    machine_code, Category, Industry, Machine, MachineDocument, MachineImage,
};
use common::requests::admin::MachinePayload;
use common::requests::machine_filter::MachineFilter;
use common::slug::{candidates, slugify};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const PUBLIC_ID_ATTEMPTS: usize = 10;

impl Resource for Category {
    const TABLE: &'static str = "categories";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        Category::prepare(self)
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, name, slug, description, icon, display_order FROM categories
             ORDER BY display_order, name",
        )?;
        let rows = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        Ok(conn.query_row(
            "SELECT id, name, slug, description, icon, display_order FROM categories
             WHERE id = ?1",
            params![id],
            category_from_row,
        )?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO categories (name, slug, description, icon, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.name, self.slug, self.description, self.icon, self.display_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        expect_changed(conn.execute(
            "UPDATE categories SET name = ?2, slug = ?3, description = ?4, icon = ?5,
             display_order = ?6 WHERE id = ?1",
            params![id, self.name, self.slug, self.description, self.icon, self.display_order],
        )?)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
        display_order: row.get(5)?,
    })
}

const INDUSTRY_COLUMNS: &str =
    "i.id, i.name, i.slug, i.description, i.icon, i.feature_statement, i.display_order";

impl Resource for Industry {
    const TABLE: &'static str = "industries";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        Industry::prepare(self)
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let sql = format!(
            "SELECT {} FROM industries i ORDER BY i.display_order, i.name",
            INDUSTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], industry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        let sql = format!("SELECT {} FROM industries i WHERE i.id = ?1", INDUSTRY_COLUMNS);
        Ok(conn.query_row(&sql, params![id], industry_from_row)?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO industries (name, slug, description, icon, feature_statement, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.name,
                self.slug,
                self.description,
                self.icon,
                self.feature_statement,
                self.display_order
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        expect_changed(conn.execute(
            "UPDATE industries SET name = ?2, slug = ?3, description = ?4, icon = ?5,
             feature_statement = ?6, display_order = ?7 WHERE id = ?1",
            params![
                id,
                self.name,
                self.slug,
                self.description,
                self.icon,
                self.feature_statement,
                self.display_order
            ],
        )?)
    }
}

fn industry_from_row(row: &Row<'_>) -> rusqlite::Result<Industry> {
    Ok(Industry {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
        feature_statement: row.get(5)?,
        display_order: row.get(6)?,
    })
}

/// Industries a machine is linked to, in display order.
pub fn industries_of(conn: &Connection, machine_id: i64) -> Result<Vec<Industry>, StoreError> {
    let sql = format!(
        "SELECT {} FROM industries i
         JOIN machine_industries mi ON mi.industry_id = i.id
         WHERE mi.machine_id = ?1 ORDER BY i.display_order, i.name",
        INDUSTRY_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![machine_id], industry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

const MACHINE_COLUMNS: &str = "m.id, m.public_id, m.name, m.slug, m.category_id, \
    m.short_description, m.description, m.key_features, m.model_number, m.manufacturer, \
    m.power_rating_kw, m.capacity_output, m.price_from, m.currency, m.lead_time_weeks, \
    m.warranty_months, m.availability_status, m.highlight_text, m.hero_image, m.brochure, \
    m.video_url, m.is_featured, m.financing_available, m.created_at, m.updated_at";

const MACHINE_ORDER: &str = "ORDER BY m.is_featured DESC, m.name ASC, m.id ASC";
const NAME_ORDER: &str = "ORDER BY m.name ASC, m.id ASC";

fn machine_from_row(row: &Row<'_>) -> rusqlite::Result<Machine> {
    Ok(Machine {
        id: row.get(0)?,
        public_id: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        category_id: row.get(4)?,
        industry_ids: Vec::new(),
        short_description: row.get(5)?,
        description: row.get(6)?,
        key_features: row.get(7)?,
        model_number: row.get(8)?,
        manufacturer: row.get(9)?,
        power_rating_kw: decimal_column(row, 10)?,
        capacity_output: row.get(11)?,
        price_from: decimal_column(row, 12)?,
        currency: row.get(13)?,
        lead_time_weeks: row.get(14)?,
        warranty_months: row.get(15)?,
        availability: enum_column(row, 16)?,
        highlight_text: row.get(17)?,
        hero_image: row.get(18)?,
        brochure: row.get(19)?,
        video_url: row.get(20)?,
        is_featured: row.get(21)?,
        financing_available: row.get(22)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
    })
}

fn industry_ids(conn: &Connection, machine_id: i64) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT industry_id FROM machine_industries WHERE machine_id = ?1 ORDER BY industry_id",
    )?;
    let ids = stmt
        .query_map(params![machine_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

fn query_machines(
    conn: &Connection,
    sql: &str,
    values: Vec<Value>,
) -> Result<Vec<Machine>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let mut machines = stmt
        .query_map(params_from_iter(values), machine_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for machine in &mut machines {
        machine.industry_ids = industry_ids(conn, machine.id)?;
    }
    Ok(machines)
}

fn select_machine(conn: &Connection, column: &str, value: Value) -> Result<Machine, StoreError> {
    let sql = format!("SELECT {} FROM machines m WHERE m.{} = ?1", MACHINE_COLUMNS, column);
    query_machines(conn, &sql, vec![value])?
        .into_iter()
        .next()
        .ok_or(StoreError::NotFound)
}

pub fn get_machine(conn: &Connection, id: i64) -> Result<Machine, StoreError> {
    select_machine(conn, "id", Value::Integer(id))
}

pub fn get_machine_by_slug(conn: &Connection, slug: &str) -> Result<Machine, StoreError> {
    select_machine(conn, "slug", Value::Text(slug.to_string()))
}

/// Every machine in listing order: featured first, then by name.
pub fn list_machines(conn: &Connection) -> Result<Vec<Machine>, StoreError> {
    filter_machines(conn, &MachineFilter::default())
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn real(value: Decimal) -> Value {
    Value::Real(value.to_f64().unwrap_or(f64::MAX))
}

/// Machines matching every criterion of `filter`, in listing order.
pub fn filter_machines(conn: &Connection, filter: &MachineFilter) -> Result<Vec<Machine>, StoreError> {
    fn bind(value: Value, values: &mut Vec<Value>) -> usize {
        values.push(value);
        values.len()
    }

    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(search) = &filter.search {
        let n = bind(Value::Text(like_pattern(search)), &mut values);
        let columns = [
            "m.name",
            "m.short_description",
            "m.model_number",
            "m.manufacturer",
            "m.description",
        ];
        let any = columns
            .iter()
            .map(|column| format!("{} LIKE ?{} ESCAPE '\\'", column, n))
            .collect::<Vec<_>>()
            .join(" OR ");
        clauses.push(format!("({})", any));
    }
    if let Some(category_id) = filter.category_id {
        let n = bind(Value::Integer(category_id), &mut values);
        clauses.push(format!("m.category_id = ?{}", n));
    }
    if let Some(industry_id) = filter.industry_id {
        let n = bind(Value::Integer(industry_id), &mut values);
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM machine_industries mi
                     WHERE mi.machine_id = m.id AND mi.industry_id = ?{})",
            n
        ));
    }
    if let Some(availability) = filter.availability {
        let n = bind(Value::Text(availability.as_str().to_string()), &mut values);
        clauses.push(format!("m.availability_status = ?{}", n));
    }
    if filter.financing {
        clauses.push("m.financing_available = 1".to_string());
    }
    if let Some(min) = filter.power_min {
        let n = bind(real(min), &mut values);
        clauses.push(format!(
            "m.power_rating_kw IS NOT NULL AND CAST(m.power_rating_kw AS REAL) >= ?{}",
            n
        ));
    }
    if let Some(max) = filter.power_max {
        let n = bind(real(max), &mut values);
        clauses.push(format!(
            "m.power_rating_kw IS NOT NULL AND CAST(m.power_rating_kw AS REAL) <= ?{}",
            n
        ));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM machines m {} {}",
        MACHINE_COLUMNS, where_clause, MACHINE_ORDER
    );
    query_machines(conn, &sql, values)
}

/// Featured machines by name, for the landing page.
pub fn featured_machines(conn: &Connection, limit: usize) -> Result<Vec<Machine>, StoreError> {
    let sql = format!(
        "SELECT {} FROM machines m WHERE m.is_featured = 1 {} LIMIT ?1",
        MACHINE_COLUMNS, NAME_ORDER
    );
    query_machines(conn, &sql, vec![Value::Integer(limit as i64)])
}

/// Other machines from the same category as `machine`, by name.
pub fn related_machines(
    conn: &Connection,
    machine: &Machine,
    limit: usize,
) -> Result<Vec<Machine>, StoreError> {
    let sql = format!(
        "SELECT {} FROM machines m WHERE m.category_id = ?1 AND m.id != ?2 {} LIMIT ?3",
        MACHINE_COLUMNS, NAME_ORDER
    );
    query_machines(
        conn,
        &sql,
        vec![
            Value::Integer(machine.category_id),
            Value::Integer(machine.id),
            Value::Integer(limit as i64),
        ],
    )
}

fn slug_taken(conn: &Connection, slug: &str, except: Option<i64>) -> Result<bool, StoreError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM machines WHERE slug = ?1 AND id != ?2)",
        params![slug, except.unwrap_or(0)],
        |row| row.get(0),
    )?)
}

/// First of `base`, `base-1`, `base-2`, ... that no other machine uses.
pub fn unique_machine_slug(
    conn: &Connection,
    base: &str,
    except: Option<i64>,
) -> Result<String, StoreError> {
    for candidate in candidates(base) {
        if !slug_taken(conn, &candidate, except)? {
            return Ok(candidate);
        }
    }
    unreachable!("candidate sequence is unbounded")
}

fn unique_public_id(conn: &Connection) -> Result<String, StoreError> {
    for _ in 0..PUBLIC_ID_ATTEMPTS {
        let code = machine_code(Utc::now());
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM machines WHERE public_id = ?1)",
            params![code],
            |row| row.get(0),
        )?;
        if !taken {
            return Ok(code);
        }
    }
    Err(StoreError::Conflict(
        "could not allocate a unique machine code".to_string(),
    ))
}

fn replace_industries(conn: &Connection, machine_id: i64, ids: &[i64]) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM machine_industries WHERE machine_id = ?1",
        params![machine_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO machine_industries (machine_id, industry_id) VALUES (?1, ?2)",
    )?;
    for industry_id in ids {
        stmt.execute(params![machine_id, industry_id])?;
    }
    Ok(())
}

/// Creates a machine with a fresh public code.
///
/// Without an explicit slug one is derived from the name and suffixed until
/// unique. An explicit slug that is already taken is a conflict.
pub fn insert_machine(conn: &Connection, payload: &MachinePayload) -> Result<Machine, StoreError> {
    let slug = match payload.explicit_slug() {
        Some(explicit) => slugify(explicit),
        None => unique_machine_slug(conn, &slugify(&payload.name), None)?,
    };
    let public_id = unique_public_id(conn)?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO machines (public_id, name, slug, category_id, short_description,
            description, key_features, model_number, manufacturer, power_rating_kw,
            capacity_output, price_from, currency, lead_time_weeks, warranty_months,
            availability_status, highlight_text, video_url, is_featured, financing_available,
            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
            ?18, ?19, ?20, ?21, ?22)",
        params![
            public_id,
            payload.name.trim(),
            slug,
            payload.category_id,
            payload.short_description.trim(),
            payload.description.trim(),
            payload.key_features,
            payload.model_number.trim(),
            payload.manufacturer.trim(),
            decimal_to_sql(payload.power_rating_kw),
            payload.capacity_output.trim(),
            decimal_to_sql(payload.price_from),
            payload.currency.trim().to_ascii_uppercase(),
            payload.lead_time_weeks,
            payload.warranty_months,
            payload.availability.as_str(),
            payload.highlight_text.trim(),
            payload.video_url.trim(),
            payload.is_featured,
            payload.financing_available,
            now,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    replace_industries(conn, id, &payload.industry_ids)?;
    get_machine(conn, id)
}

/// Rewrites the editable fields of a machine.
///
/// The public code never changes, and the slug only changes when the payload
/// names one explicitly.
pub fn update_machine(
    conn: &Connection,
    id: i64,
    payload: &MachinePayload,
) -> Result<Machine, StoreError> {
    let current = get_machine(conn, id)?;
    let slug = payload
        .explicit_slug()
        .map(slugify)
        .unwrap_or(current.slug);
    conn.execute(
        "UPDATE machines SET name = ?2, slug = ?3, category_id = ?4, short_description = ?5,
            description = ?6, key_features = ?7, model_number = ?8, manufacturer = ?9,
            power_rating_kw = ?10, capacity_output = ?11, price_from = ?12, currency = ?13,
            lead_time_weeks = ?14, warranty_months = ?15, availability_status = ?16,
            highlight_text = ?17, video_url = ?18, is_featured = ?19,
            financing_available = ?20, updated_at = ?21
         WHERE id = ?1",
        params![
            id,
            payload.name.trim(),
            slug,
            payload.category_id,
            payload.short_description.trim(),
            payload.description.trim(),
            payload.key_features,
            payload.model_number.trim(),
            payload.manufacturer.trim(),
            decimal_to_sql(payload.power_rating_kw),
            payload.capacity_output.trim(),
            decimal_to_sql(payload.price_from),
            payload.currency.trim().to_ascii_uppercase(),
            payload.lead_time_weeks,
            payload.warranty_months,
            payload.availability.as_str(),
            payload.highlight_text.trim(),
            payload.video_url.trim(),
            payload.is_featured,
            payload.financing_available,
            Utc::now(),
        ],
    )?;
    replace_industries(conn, id, &payload.industry_ids)?;
    get_machine(conn, id)
}

pub fn delete_machine(conn: &Connection, id: i64) -> Result<(), StoreError> {
    expect_changed(conn.execute("DELETE FROM machines WHERE id = ?1", params![id])?)
}

/// File columns of a machine that hold a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineFile {
    HeroImage,
    Brochure,
}

impl MachineFile {
    fn column(self) -> &'static str {
        match self {
            MachineFile::HeroImage => "hero_image",
            MachineFile::Brochure => "brochure",
        }
    }
}

/// Points `file` at `path` and returns the path it replaced, if any.
pub fn set_machine_file(
    conn: &Connection,
    id: i64,
    file: MachineFile,
    path: Option<&str>,
) -> Result<Option<String>, StoreError> {
    let select = format!("SELECT {} FROM machines WHERE id = ?1", file.column());
    let previous: Option<String> = conn
        .query_row(&select, params![id], |row| row.get(0))
        .optional()?
        .ok_or(StoreError::NotFound)?;
    let update = format!(
        "UPDATE machines SET {} = ?2, updated_at = ?3 WHERE id = ?1",
        file.column()
    );
    conn.execute(&update, params![id, path, Utc::now()])?;
    Ok(previous)
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<MachineImage> {
    Ok(MachineImage {
        id: row.get(0)?,
        machine_id: row.get(1)?,
        image: row.get(2)?,
        caption: row.get(3)?,
        is_primary: row.get(4)?,
        display_order: row.get(5)?,
    })
}

/// Gallery images, primary first.
pub fn machine_images(conn: &Connection, machine_id: i64) -> Result<Vec<MachineImage>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, machine_id, image, caption, is_primary, display_order FROM machine_images
         WHERE machine_id = ?1 ORDER BY is_primary DESC, display_order, id",
    )?;
    let rows = stmt
        .query_map(params![machine_id], image_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn add_machine_image(
    conn: &Connection,
    machine_id: i64,
    image: &str,
    caption: &str,
    is_primary: bool,
    display_order: u32,
) -> Result<MachineImage, StoreError> {
    conn.execute(
        "INSERT INTO machine_images (machine_id, image, caption, is_primary, display_order)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![machine_id, image, caption, is_primary, display_order],
    )?;
    Ok(conn.query_row(
        "SELECT id, machine_id, image, caption, is_primary, display_order FROM machine_images
         WHERE id = ?1",
        params![conn.last_insert_rowid()],
        image_from_row,
    )?)
}

/// Removes an image of `machine_id` and returns its stored path.
pub fn delete_machine_image(
    conn: &Connection,
    machine_id: i64,
    image_id: i64,
) -> Result<String, StoreError> {
    let path: String = conn.query_row(
        "SELECT image FROM machine_images WHERE id = ?1 AND machine_id = ?2",
        params![image_id, machine_id],
        |row| row.get(0),
    )?;
    conn.execute("DELETE FROM machine_images WHERE id = ?1", params![image_id])?;
    Ok(path)
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<MachineDocument> {
    Ok(MachineDocument {
        id: row.get(0)?,
        machine_id: row.get(1)?,
        label: row.get(2)?,
        document: row.get(3)?,
    })
}

pub fn machine_documents(
    conn: &Connection,
    machine_id: i64,
) -> Result<Vec<MachineDocument>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, machine_id, label, document FROM machine_documents
         WHERE machine_id = ?1 ORDER BY label, id",
    )?;
    let rows = stmt
        .query_map(params![machine_id], document_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn add_machine_document(
    conn: &Connection,
    machine_id: i64,
    label: &str,
    document: &str,
) -> Result<MachineDocument, StoreError> {
    conn.execute(
        "INSERT INTO machine_documents (machine_id, label, document) VALUES (?1, ?2, ?3)",
        params![machine_id, label, document],
    )?;
    Ok(conn.query_row(
        "SELECT id, machine_id, label, document FROM machine_documents WHERE id = ?1",
        params![conn.last_insert_rowid()],
        document_from_row,
    )?)
}

pub fn delete_machine_document(
    conn: &Connection,
    machine_id: i64,
    document_id: i64,
) -> Result<String, StoreError> {
    let path: String = conn.query_row(
        "SELECT document FROM machine_documents WHERE id = ?1 AND machine_id = ?2",
        params![document_id, machine_id],
        |row| row.get(0),
    )?;
    conn.execute(
        "DELETE FROM machine_documents WHERE id = ?1",
        params![document_id],
    )?;
    Ok(path)
}
