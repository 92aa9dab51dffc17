use crate::forms::{FieldErrors, check_text};
use crate::model::catalogue::Availability;
use crate::model::custom_request::RequestStatus;
use crate::slug::slugify;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "USD".to_string()
}

fn default_lead_time() -> u32 {
    8
}

fn default_warranty() -> u32 {
    12
}

/// Machine fields an operator can set. The public code and timestamps are
/// generated by the backend; the slug is derived from the name on creation
/// when left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachinePayload {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub industry_ids: Vec<i64>,
    pub short_description: String,
    pub description: String,
    #[serde(default)]
    pub key_features: String,
    #[serde(default)]
    pub model_number: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub power_rating_kw: Option<Decimal>,
    #[serde(default)]
    pub capacity_output: String,
    #[serde(default)]
    pub price_from: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_lead_time")]
    pub lead_time_weeks: u32,
    #[serde(default = "default_warranty")]
    pub warranty_months: u32,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub highlight_text: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub financing_available: bool,
}

impl MachinePayload {
    /// The operator supplied slug, if any non-blank one was sent.
    pub fn explicit_slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Field checks that need no storage lookups.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, true, 150);
        check_text(&mut errors, "short_description", &self.short_description, true, 255);
        check_text(&mut errors, "description", &self.description, true, usize::MAX);
        check_text(&mut errors, "model_number", &self.model_number, false, 80);
        check_text(&mut errors, "manufacturer", &self.manufacturer, false, 120);
        check_text(&mut errors, "capacity_output", &self.capacity_output, false, 120);
        check_text(&mut errors, "currency", &self.currency, true, 5);
        check_text(&mut errors, "highlight_text", &self.highlight_text, false, 120);
        check_text(&mut errors, "video_url", &self.video_url, false, 200);
        match self.explicit_slug() {
            Some(slug) => {
                check_text(&mut errors, "slug", slug, false, 50);
                if slugify(slug).is_empty() {
                    errors.add("slug", "Enter a valid slug.");
                }
            }
            None => {
                if !self.name.trim().is_empty() && slugify(&self.name).is_empty() {
                    errors.add("name", "Name must contain at least one letter or digit.");
                }
            }
        }
        for (field, value) in [
            ("power_rating_kw", self.power_rating_kw),
            ("price_from", self.price_from),
        ] {
            if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
                errors.add(field, "Ensure this value is greater than or equal to 0.");
            }
        }
        errors.into_result(())
    }
}

/// Operator edit of a request: a new status, new notes, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUpdate {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub internal_notes: Option<String>,
    /// Recorded on the log row if the status changes.
    #[serde(default)]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults() {
        let payload: MachinePayload = serde_json::from_str(
            r#"{"name":"Press","category_id":1,"short_description":"s","description":"d"}"#,
        )
        .unwrap();
        assert_eq!(payload.currency, "USD");
        assert_eq!(payload.lead_time_weeks, 8);
        assert_eq!(payload.warranty_months, 12);
        assert_eq!(payload.availability, Availability::InStock);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let payload: MachinePayload = serde_json::from_str(
            r#"{"name":"Press","category_id":1,"short_description":"s","description":"d","price_from":"-5"}"#,
        )
        .unwrap();
        assert!(payload.validate().unwrap_err().contains("price_from"));
    }

    #[test]
    fn name_without_slug_characters_is_rejected() {
        let payload: MachinePayload = serde_json::from_str(
            r#"{"name":"???","category_id":1,"short_description":"s","description":"d"}"#,
        )
        .unwrap();
        assert!(payload.validate().unwrap_err().contains("name"));
    }

    #[test]
    fn request_update_accepts_partial_bodies() {
        let update: RequestUpdate = serde_json::from_str(r#"{"status":"quoted"}"#).unwrap();
        assert_eq!(update.status, Some(RequestStatus::Quoted));
        assert_eq!(update.internal_notes, None);
    }
}
