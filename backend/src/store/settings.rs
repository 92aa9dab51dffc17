use super::{Resource, StoreError};
use chrono::Utc;
use common::forms::FieldErrors;
use common::model::settings::{HeroMetric, SiteSettings, ValueProposition};
use rusqlite::{params, Connection, Row};

/// The only id the settings table accepts.
pub const SETTINGS_ID: i64 = 1;

const COLUMNS: &str = "business_name, tagline, hero_title, hero_subtitle, \
    primary_cta_label, primary_cta_link, secondary_cta_label, secondary_cta_link, \
    hero_background, about_title, about_body, experience_highlight, experience_years, \
    machines_deployed, uptime_commitment, response_time, contact_email, contact_phone, \
    whatsapp_link, operation_regions, support_hours, newsletter_blurb, promo_video_url, \
    footer_statement, created_at, updated_at";

fn settings_from_row(row: &Row<'_>) -> rusqlite::Result<SiteSettings> {
    Ok(SiteSettings {
        business_name: row.get(0)?,
        tagline: row.get(1)?,
        hero_title: row.get(2)?,
        hero_subtitle: row.get(3)?,
        primary_cta_label: row.get(4)?,
        primary_cta_link: row.get(5)?,
        secondary_cta_label: row.get(6)?,
        secondary_cta_link: row.get(7)?,
        hero_background: row.get(8)?,
        about_title: row.get(9)?,
        about_body: row.get(10)?,
        experience_highlight: row.get(11)?,
        experience_years: row.get(12)?,
        machines_deployed: row.get(13)?,
        uptime_commitment: row.get(14)?,
        response_time: row.get(15)?,
        contact_email: row.get(16)?,
        contact_phone: row.get(17)?,
        whatsapp_link: row.get(18)?,
        operation_regions: row.get(19)?,
        support_hours: row.get(20)?,
        newsletter_blurb: row.get(21)?,
        promo_video_url: row.get(22)?,
        footer_statement: row.get(23)?,
        created_at: row.get(24)?,
        updated_at: row.get(25)?,
    })
}

pub fn get(conn: &Connection) -> Result<SiteSettings, StoreError> {
    let sql = format!("SELECT {} FROM site_settings WHERE id = ?1", COLUMNS);
    Ok(conn.query_row(&sql, params![SETTINGS_ID], settings_from_row)?)
}

/// Returns the canonical row, creating it from the stock copy when missing.
pub fn load_or_create(conn: &Connection) -> Result<SiteSettings, StoreError> {
    match get(conn) {
        Ok(settings) => Ok(settings),
        Err(StoreError::NotFound) => {
            log::info!("Creating default site settings");
            save(conn, &SiteSettings::default())
        }
        Err(e) => Err(e),
    }
}

/// Writes `settings` to the canonical row, whatever it was loaded from.
///
/// The creation timestamp of an existing row is kept; `updated_at` is
/// stamped now. Returns the row as stored.
pub fn save(conn: &Connection, settings: &SiteSettings) -> Result<SiteSettings, StoreError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO site_settings (id, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
         ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)
         ON CONFLICT(id) DO UPDATE SET
            business_name = excluded.business_name,
            tagline = excluded.tagline,
            hero_title = excluded.hero_title,
            hero_subtitle = excluded.hero_subtitle,
            primary_cta_label = excluded.primary_cta_label,
            primary_cta_link = excluded.primary_cta_link,
            secondary_cta_label = excluded.secondary_cta_label,
            secondary_cta_link = excluded.secondary_cta_link,
            hero_background = excluded.hero_background,
            about_title = excluded.about_title,
            about_body = excluded.about_body,
            experience_highlight = excluded.experience_highlight,
            experience_years = excluded.experience_years,
            machines_deployed = excluded.machines_deployed,
            uptime_commitment = excluded.uptime_commitment,
            response_time = excluded.response_time,
            contact_email = excluded.contact_email,
            contact_phone = excluded.contact_phone,
            whatsapp_link = excluded.whatsapp_link,
            operation_regions = excluded.operation_regions,
            support_hours = excluded.support_hours,
            newsletter_blurb = excluded.newsletter_blurb,
            promo_video_url = excluded.promo_video_url,
            footer_statement = excluded.footer_statement,
            updated_at = excluded.updated_at",
        COLUMNS
    );
    conn.execute(
        &sql,
        params![
            SETTINGS_ID,
            settings.business_name,
            settings.tagline,
            settings.hero_title,
            settings.hero_subtitle,
            settings.primary_cta_label,
            settings.primary_cta_link,
            settings.secondary_cta_label,
            settings.secondary_cta_link,
            settings.hero_background,
            settings.about_title,
            settings.about_body,
            settings.experience_highlight,
            settings.experience_years,
            settings.machines_deployed,
            settings.uptime_commitment,
            settings.response_time,
            settings.contact_email,
            settings.contact_phone,
            settings.whatsapp_link,
            settings.operation_regions,
            settings.support_hours,
            settings.newsletter_blurb,
            settings.promo_video_url,
            settings.footer_statement,
            now,
            now,
        ],
    )?;
    get(conn)
}

fn ensure_settings_row(conn: &Connection) -> Result<(), StoreError> {
    load_or_create(conn).map(|_| ())
}

impl Resource for HeroMetric {
    const TABLE: &'static str = "hero_metrics";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        self.validate()
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, label, value, icon, display_order FROM hero_metrics
             WHERE settings_id = ?1 ORDER BY display_order, id",
        )?;
        let rows = stmt
            .query_map(params![SETTINGS_ID], metric_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        Ok(conn.query_row(
            "SELECT id, label, value, icon, display_order FROM hero_metrics WHERE id = ?1",
            params![id],
            metric_from_row,
        )?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        ensure_settings_row(conn)?;
        conn.execute(
            "INSERT INTO hero_metrics (settings_id, label, value, icon, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![SETTINGS_ID, self.label, self.value, self.icon, self.display_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        super::expect_changed(conn.execute(
            "UPDATE hero_metrics SET label = ?2, value = ?3, icon = ?4, display_order = ?5
             WHERE id = ?1",
            params![id, self.label, self.value, self.icon, self.display_order],
        )?)
    }
}

fn metric_from_row(row: &Row<'_>) -> rusqlite::Result<HeroMetric> {
    Ok(HeroMetric {
        id: row.get(0)?,
        label: row.get(1)?,
        value: row.get(2)?,
        icon: row.get(3)?,
        display_order: row.get(4)?,
    })
}

impl Resource for ValueProposition {
    const TABLE: &'static str = "value_propositions";

    fn prepare(&mut self) -> Result<(), FieldErrors> {
        self.validate()
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, title, description, icon, display_order FROM value_propositions
             WHERE settings_id = ?1 ORDER BY display_order, id",
        )?;
        let rows = stmt
            .query_map(params![SETTINGS_ID], proposition_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError> {
        Ok(conn.query_row(
            "SELECT id, title, description, icon, display_order FROM value_propositions
             WHERE id = ?1",
            params![id],
            proposition_from_row,
        )?)
    }

    fn insert(&self, conn: &Connection) -> Result<i64, StoreError> {
        ensure_settings_row(conn)?;
        conn.execute(
            "INSERT INTO value_propositions (settings_id, title, description, icon, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![SETTINGS_ID, self.title, self.description, self.icon, self.display_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError> {
        super::expect_changed(conn.execute(
            "UPDATE value_propositions SET title = ?2, description = ?3, icon = ?4,
             display_order = ?5 WHERE id = ?1",
            params![id, self.title, self.description, self.icon, self.display_order],
        )?)
    }
}

fn proposition_from_row(row: &Row<'_>) -> rusqlite::Result<ValueProposition> {
    Ok(ValueProposition {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        display_order: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn count(store: &Store) -> i64 {
        store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM site_settings", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .unwrap()
    }

    #[test]
    fn loading_twice_keeps_a_single_row() {
        let store = Store::open_in_memory().unwrap();
        let first = store.write(|tx| load_or_create(tx)).unwrap();
        let second = store.write(|tx| load_or_create(tx)).unwrap();
        assert_eq!(first.business_name, second.business_name);
        assert_eq!(count(&store), 1);
    }

    #[test]
    fn save_always_lands_on_the_canonical_row() {
        let store = Store::open_in_memory().unwrap();
        let created = store.write(|tx| load_or_create(tx)).unwrap();
        let edited = SiteSettings {
            business_name: "Acme Brokers".to_string(),
            ..SiteSettings::default()
        };
        let saved = store.write(|tx| save(tx, &edited)).unwrap();
        assert_eq!(saved.business_name, "Acme Brokers");
        assert_eq!(saved.created_at, created.created_at);
        assert_eq!(count(&store), 1);
    }

    #[test]
    fn metrics_are_ordered_and_removed_with_settings() {
        let store = Store::open_in_memory().unwrap();
        store
            .write(|tx| {
                for (label, order) in [("Uptime", 2), ("Countries", 1)] {
                    HeroMetric {
                        id: 0,
                        label: label.to_string(),
                        value: "1".to_string(),
                        icon: String::new(),
                        display_order: order,
                    }
                    .insert(tx)?;
                }
                Ok::<_, StoreError>(())
            })
            .unwrap();
        let labels: Vec<String> = store
            .read(|conn| HeroMetric::list(conn))
            .unwrap()
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(labels, ["Countries", "Uptime"]);

        store
            .write(|tx| {
                tx.execute("DELETE FROM site_settings", [])
                    .map_err(StoreError::from)
            })
            .unwrap();
        assert!(store.read(|conn| HeroMetric::list(conn)).unwrap().is_empty());
    }
}
