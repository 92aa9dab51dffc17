use super::{expect_changed, row_exists, Resource, StoreError};
use common::forms::{FieldErrors, INVALID_CHOICE};
use common::model::content::{Faq, Partner, ServiceOffering, Testimonial};
use rusqlite::{params, Connection, Row};

const TESTIMONIAL_COLUMNS: &str = "id, client_name, client_role, company, industry_id, quote, \
    rating, highlight, avatar, created_at";

fn testimonial_from_row(row: &Row<'_>) -> rusqlite::Result<Testimonial> {
    Ok(Testimonial {
        id: row.get(0)?,
        client_name: row.get(1)?,
        client_role: row.get(2)?,
        company: row.get(3)?,
        industry_id: row.get(4)?,
        quote: row.get(5)?,
        rating: row.get(6)?,
        highlight: row.get(7)?,
        avatar: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl Resource for Testimonial {
    const TABLE: &'static str = "testimonials";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        self.validate()
    }

    fn check_references(&self, conn: &Connection) -> Result<FieldErrors, StoreError> {
        let mut errors = FieldErrors::new();
        if let Some(industry_id) = self.industry_id {
            if !row_exists(conn, "industries", industry_id)? {
                errors.add("industry_id", INVALID_CHOICE);
            }
        }
        Ok(errors)
    }

    /// Highlighted first, then newest.
    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let sql = format!(
            "SELECT {} FROM testimonials ORDER BY highlight DESC, created_at DESC, id DESC",
            TESTIMONIAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], testimonial_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        let sql = format!("SELECT {} FROM testimonials WHERE id = ?1", TESTIMONIAL_COLUMNS);
        Ok(conn.query_row(&sql, params![id], testimonial_from_row)?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO testimonials (client_name, client_role, company, industry_id, quote,
                rating, highlight, avatar, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                self.client_name,
                self.client_role,
                self.company,
                self.industry_id,
                self.quote,
                self.rating,
                self.highlight,
                self.avatar,
                self.created_at
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        expect_changed(conn.execute(
            "UPDATE testimonials SET client_name = ?2, client_role = ?3, company = ?4,
                industry_id = ?5, quote = ?6, rating = ?7, highlight = ?8, avatar = ?9
             WHERE id = ?1",
            params![
                id,
                self.client_name,
                self.client_role,
                self.company,
                self.industry_id,
                self.quote,
                self.rating,
                self.highlight,
                self.avatar
            ],
        )?)
    }
}

fn partner_from_row(row: &Row<'_>) -> rusqlite::Result<Partner> {
    Ok(Partner {
        id: row.get(0)?,
        name: row.get(1)?,
        website: row.get(2)?,
        logo: row.get(3)?,
        caption: row.get(4)?,
        display_order: row.get(5)?,
    })
}

impl Resource for Partner {
    const TABLE: &'static str = "partners";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        self.validate()
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, name, website, logo, caption, display_order FROM partners
             ORDER BY display_order, name",
        )?;
        let rows = stmt
            .query_map([], partner_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        Ok(conn.query_row(
            "SELECT id, name, website, logo, caption, display_order FROM partners WHERE id = ?1",
            params![id],
            partner_from_row,
        )?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO partners (name, website, logo, caption, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.name, self.website, self.logo, self.caption, self.display_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        expect_changed(conn.execute(
            "UPDATE partners SET name = ?2, website = ?3, logo = ?4, caption = ?5,
                display_order = ?6 WHERE id = ?1",
            params![id, self.name, self.website, self.logo, self.caption, self.display_order],
        )?)
    }
}

fn faq_from_row(row: &Row<'_>) -> rusqlite::Result<Faq> {
    Ok(Faq {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        category: row.get(3)?,
        display_order: row.get(4)?,
    })
}

impl Resource for Faq {
    const TABLE: &'static str = "faqs";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        self.validate()
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, display_order FROM faqs
             ORDER BY display_order, question",
        )?;
        let rows = stmt
            .query_map([], faq_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        Ok(conn.query_row(
            "SELECT id, question, answer, category, display_order FROM faqs WHERE id = ?1",
            params![id],
            faq_from_row,
        )?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO faqs (question, answer, category, display_order) VALUES (?1, ?2, ?3, ?4)",
            params![self.question, self.answer, self.category, self.display_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        expect_changed(conn.execute(
            "UPDATE faqs SET question = ?2, answer = ?3, category = ?4, display_order = ?5
             WHERE id = ?1",
            params![id, self.question, self.answer, self.category, self.display_order],
        )?)
    }
}

fn service_from_row(row: &Row<'_>) -> rusqlite::Result<ServiceOffering> {
    Ok(ServiceOffering {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        display_order: row.get(4)?,
    })
}

impl Resource for ServiceOffering {
    const TABLE: &'static str = "service_offerings";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        self.validate()
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, title, description, icon, display_order FROM service_offerings
             ORDER BY display_order, id",
        )?;
        let rows = stmt
            .query_map([], service_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        Ok(conn.query_row(
            "SELECT id, title, description, icon, display_order FROM service_offerings
             WHERE id = ?1",
            params![id],
            service_from_row,
        )?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO service_offerings (title, description, icon, display_order)
             VALUES (?1, ?2, ?3, ?4)",
            params![self.title, self.description, self.icon, self.display_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        expect_changed(conn.execute(
            "UPDATE service_offerings SET title = ?2, description = ?3, icon = ?4,
                display_order = ?5 WHERE id = ?1",
            params![id, self.title, self.description, self.icon, self.display_order],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::{Duration, Utc};

    fn testimonial(name: &str, highlight: bool, age_days: i64) -> Testimonial {
        Testimonial {
            id: 0,
            client_name: name.to_string(),
            client_role: String::new(),
            company: "NovaVolt".to_string(),
            industry_id: None,
            quote: "Great partner.".to_string(),
            rating: 5,
            highlight,
            avatar: None,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn testimonials_put_highlights_first_then_newest() {
        let store = Store::open_in_memory().unwrap();
        store
            .write(|tx| {
                testimonial("Old", false, 10).insert(tx)?;
                testimonial("New", false, 1).insert(tx)?;
                testimonial("Starred", true, 30).insert(tx)?;
                Ok::<_, StoreError>(())
            })
            .unwrap();
        let names: Vec<String> = store
            .read(|conn| Testimonial::list(conn))
            .unwrap()
            .into_iter()
            .map(|t| t.client_name)
            .collect();
        assert_eq!(names, ["Starred", "New", "Old"]);
    }

    #[test]
    fn unknown_industry_reference_is_reported() {
        let store = Store::open_in_memory().unwrap();
        let mut t = testimonial("Amelia", false, 0);
        t.industry_id = Some(42);
        let errors = store.read(|conn| t.check_references(conn)).unwrap();
        assert!(errors.contains("industry_id"));
    }

    #[test]
    fn update_and_delete_of_missing_rows_are_not_found() {
        let store = Store::open_in_memory().unwrap();
        let faq = Faq {
            id: 0,
            question: "Do you ship globally?".to_string(),
            answer: "Yes.".to_string(),
            category: String::new(),
            display_order: 0,
        };
        let update = store.write(|tx| faq.update(tx, 7));
        assert!(matches!(update, Err(StoreError::NotFound)));
        let delete = store.write(|tx| Faq::delete(tx, 7));
        assert!(matches!(delete, Err(StoreError::NotFound)));
    }
}
