use crate::forms::{FieldErrors, check_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business copy rendered across every public page.
///
/// There is exactly one of these. The backend loads it once at start-up and
/// replaces it only through the admin settings endpoint; the stored row always
/// has id 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub business_name: String,
    pub tagline: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub primary_cta_label: String,
    pub primary_cta_link: String,
    pub secondary_cta_label: String,
    pub secondary_cta_link: String,
    /// Path under the media root, if a background has been uploaded.
    pub hero_background: Option<String>,
    pub about_title: String,
    pub about_body: String,
    pub experience_highlight: String,
    pub experience_years: u32,
    pub machines_deployed: u32,
    pub uptime_commitment: String,
    pub response_time: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub whatsapp_link: String,
    /// Comma separated list of primary regions served.
    pub operation_regions: String,
    pub support_hours: String,
    pub newsletter_blurb: String,
    pub promo_video_url: String,
    pub footer_statement: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            business_name: "Titan Nexus Industrial Supply".to_string(),
            tagline: "Powering production with precision partnerships.".to_string(),
            hero_title: "Heavy Machinery, Delivered with Intelligence".to_string(),
            hero_subtitle: "From turnkey fabrication lines to bespoke automation, we orchestrate \
                the machinery supply chain for world-class manufacturers."
                .to_string(),
            primary_cta_label: "Explore Catalogue".to_string(),
            primary_cta_link: "/catalogue/".to_string(),
            secondary_cta_label: "Request Custom Build".to_string(),
            secondary_cta_link: "/custom-request/".to_string(),
            hero_background: None,
            about_title: "Engineering Procurement Reinvented".to_string(),
            about_body: String::new(),
            experience_highlight: "Global supplier network across 18 countries with \
                ISO-compliant partner factories."
                .to_string(),
            experience_years: 18,
            machines_deployed: 450,
            uptime_commitment: "99.2% fleet uptime guarantee".to_string(),
            response_time: "Quote turnaround in under 24 hours".to_string(),
            contact_email: String::new(),
            contact_phone: String::new(),
            whatsapp_link: String::new(),
            operation_regions: String::new(),
            support_hours: "Global support 24/7".to_string(),
            newsletter_blurb: String::new(),
            promo_video_url: String::new(),
            footer_statement: "Certified general order supplier serving heavy industry since 2006."
                .to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl SiteSettings {
    pub fn regions(&self) -> Vec<&str> {
        self.operation_regions
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "business_name", &self.business_name, true, 120);
        check_text(&mut errors, "tagline", &self.tagline, false, 160);
        check_text(&mut errors, "hero_title", &self.hero_title, true, 200);
        check_text(&mut errors, "primary_cta_label", &self.primary_cta_label, true, 80);
        check_text(&mut errors, "primary_cta_link", &self.primary_cta_link, true, 200);
        check_text(&mut errors, "secondary_cta_label", &self.secondary_cta_label, false, 80);
        check_text(&mut errors, "secondary_cta_link", &self.secondary_cta_link, false, 200);
        check_text(&mut errors, "about_title", &self.about_title, true, 150);
        check_text(&mut errors, "experience_highlight", &self.experience_highlight, false, 255);
        check_text(&mut errors, "uptime_commitment", &self.uptime_commitment, true, 120);
        check_text(&mut errors, "response_time", &self.response_time, true, 120);
        check_text(&mut errors, "contact_phone", &self.contact_phone, false, 50);
        check_text(&mut errors, "operation_regions", &self.operation_regions, false, 180);
        check_text(&mut errors, "support_hours", &self.support_hours, false, 120);
        check_text(&mut errors, "newsletter_blurb", &self.newsletter_blurb, false, 255);
        check_text(&mut errors, "footer_statement", &self.footer_statement, false, 200);
        if !self.contact_email.is_empty() && !crate::forms::is_valid_email(&self.contact_email) {
            errors.add("contact_email", "Enter a valid email address.");
        }
        errors.into_result(())
    }
}

/// A headline number shown in the hero band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroMetric {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub value: String,
    /// Font Awesome icon class, e.g. `fa-solid fa-industry`.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub display_order: u32,
}

impl HeroMetric {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "label", &self.label, true, 120);
        check_text(&mut errors, "value", &self.value, true, 60);
        check_text(&mut errors, "icon", &self.icon, false, 60);
        errors.into_result(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueProposition {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub display_order: u32,
}

impl ValueProposition {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "title", &self.title, true, 120);
        check_text(&mut errors, "description", &self.description, true, usize::MAX);
        check_text(&mut errors, "icon", &self.icon, false, 60);
        errors.into_result(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SiteSettings::default().validate().is_ok());
    }

    #[test]
    fn regions_are_split_and_trimmed() {
        let settings = SiteSettings {
            operation_regions: "Pakistan, GCC,, Europe ".to_string(),
            ..SiteSettings::default()
        };
        assert_eq!(settings.regions(), ["Pakistan", "GCC", "Europe"]);
    }

    #[test]
    fn blank_business_name_is_rejected() {
        let settings = SiteSettings {
            business_name: " ".to_string(),
            contact_email: "not-an-email".to_string(),
            ..SiteSettings::default()
        };
        let errors = settings.validate().unwrap_err();
        assert!(errors.contains("business_name"));
        assert!(errors.contains("contact_email"));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings: SiteSettings =
            serde_json::from_str(r#"{"business_name":"Acme Brokers"}"#).unwrap();
        assert_eq!(settings.business_name, "Acme Brokers");
        assert_eq!(settings.primary_cta_link, "/catalogue/");
    }
}
