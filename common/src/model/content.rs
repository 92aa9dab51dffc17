use crate::forms::{FieldErrors, check_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_rating() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(default)]
    pub id: i64,
    pub client_name: String,
    #[serde(default)]
    pub client_role: String,
    pub company: String,
    /// Cleared when the industry is deleted.
    #[serde(default)]
    pub industry_id: Option<i64>,
    pub quote: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "client_name", &self.client_name, true, 120);
        check_text(&mut errors, "client_role", &self.client_role, false, 120);
        check_text(&mut errors, "company", &self.company, true, 120);
        check_text(&mut errors, "quote", &self.quote, true, usize::MAX);
        if !(1..=5).contains(&self.rating) {
            errors.add("rating", "Rating must be between 1 and 5.");
        }
        errors.into_result(())
    }

    /// Filled stars followed by empty ones, five in total.
    pub fn stars(&self) -> String {
        let filled = usize::from(self.rating.min(5));
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub display_order: u32,
}

impl Partner {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, true, 120);
        check_text(&mut errors, "website", &self.website, false, 200);
        check_text(&mut errors, "caption", &self.caption, false, 160);
        if !self.website.is_empty()
            && !(self.website.starts_with("http://") || self.website.starts_with("https://"))
        {
            errors.add("website", "Enter a valid URL.");
        }
        errors.into_result(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default)]
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub display_order: u32,
}

impl Faq {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "question", &self.question, true, 200);
        check_text(&mut errors, "answer", &self.answer, true, usize::MAX);
        check_text(&mut errors, "category", &self.category, false, 120);
        errors.into_result(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub display_order: u32,
}

impl ServiceOffering {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "title", &self.title, true, 120);
        check_text(&mut errors, "description", &self.description, true, usize::MAX);
        check_text(&mut errors, "icon", &self.icon, false, 60);
        errors.into_result(())
    }
}
