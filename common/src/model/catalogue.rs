//! Catalogue entities: taxonomies and the machines listed under them.

use crate::forms::{FieldErrors, check_text};
use crate::slug::slugify;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Derived from `name` when left blank.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub display_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub feature_statement: String,
    #[serde(default)]
    pub display_order: u32,
}

/// Normalizes `slug` in place, deriving it from `name` when blank.
///
/// Uniqueness is left to the store: taxonomies reject duplicates rather than
/// renaming them.
fn assign_slug(errors: &mut FieldErrors, name: &str, slug: &mut String) {
    let source = if slug.trim().is_empty() { name } else { slug.as_str() };
    let derived = slugify(source);
    if derived.is_empty() && !errors.contains("name") {
        errors.add("name", "Name must contain at least one letter or digit.");
    }
    *slug = derived;
}

impl Category {
    pub fn prepare(&mut self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, true, 120);
        check_text(&mut errors, "icon", &self.icon, false, 60);
        assign_slug(&mut errors, &self.name, &mut self.slug);
        errors.into_result(())
    }
}

impl Industry {
    pub fn prepare(&mut self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, true, 120);
        check_text(&mut errors, "icon", &self.icon, false, 60);
        check_text(&mut errors, "feature_statement", &self.feature_statement, false, 180);
        assign_slug(&mut errors, &self.name, &mut self.slug);
        errors.into_result(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    InStock,
    BackOrder,
    CustomBuild,
}

impl Availability {
    pub const ALL: [Availability; 3] = [
        Availability::InStock,
        Availability::BackOrder,
        Availability::CustomBuild,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::BackOrder => "back_order",
            Availability::CustomBuild => "custom_build",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::BackOrder => "Backorder",
            Availability::CustomBuild => "Custom Build",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Availability::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown availability '{}'", s))
    }
}

/// `TNX-YYYYMMDD-XXXX`, the public code printed on quotes and brochures.
pub fn machine_code(now: DateTime<Utc>) -> String {
    format!("TNX-{}-{}", now.format("%Y%m%d"), super::random_code(4))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub slug: String,
    pub category_id: i64,
    pub industry_ids: Vec<i64>,
    pub short_description: String,
    pub description: String,
    /// Bullet points separated by new lines.
    pub key_features: String,
    pub model_number: String,
    pub manufacturer: String,
    pub power_rating_kw: Option<Decimal>,
    /// e.g. `5,000 bottles/hr` or `40 TPH`.
    pub capacity_output: String,
    pub price_from: Option<Decimal>,
    pub currency: String,
    pub lead_time_weeks: u32,
    pub warranty_months: u32,
    pub availability: Availability,
    pub highlight_text: String,
    pub hero_image: Option<String>,
    pub brochure: Option<String>,
    pub video_url: String,
    pub is_featured: bool,
    pub financing_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Machine {
    /// `USD 320,000`, `EUR 1,250.50`, or `On Request` when unpriced.
    pub fn price_display(&self) -> String {
        match self.price_from {
            Some(price) => format!("{} {}", self.currency, format_amount(price)),
            None => "On Request".to_string(),
        }
    }

    pub fn feature_list(&self) -> Vec<&str> {
        self.key_features
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Thousands-separated amount; whole numbers drop the fractional part.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let whole = rounded.trunc();
    let grouped = group_thousands(&whole.abs().to_string());
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let fraction = (rounded - whole).abs();
    if fraction.is_zero() {
        format!("{}{}", sign, grouped)
    } else {
        let fraction = format!("{:.2}", fraction);
        format!("{}{}{}", sign, grouped, fraction.trim_start_matches('0'))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineImage {
    pub id: i64,
    pub machine_id: i64,
    pub image: String,
    pub caption: String,
    pub is_primary: bool,
    pub display_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDocument {
    pub id: i64,
    pub machine_id: i64,
    pub label: String,
    pub document: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn machine(price: Option<Decimal>) -> Machine {
        let now = Utc::now();
        Machine {
            id: 1,
            public_id: "TNX-20240101-AAAA".to_string(),
            name: "HyperForge".to_string(),
            slug: "hyperforge".to_string(),
            category_id: 1,
            industry_ids: vec![],
            short_description: String::new(),
            description: String::new(),
            key_features: "- Adaptive torch\n\n* Cycle analytics\n  Tool-less swaps  ".to_string(),
            model_number: String::new(),
            manufacturer: String::new(),
            power_rating_kw: None,
            capacity_output: String::new(),
            price_from: price,
            currency: "USD".to_string(),
            lead_time_weeks: 8,
            warranty_months: 12,
            availability: Availability::InStock,
            highlight_text: String::new(),
            hero_image: None,
            brochure: None,
            video_url: String::new(),
            is_featured: false,
            financing_available: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn price_display_variants() {
        assert_eq!(machine(None).price_display(), "On Request");
        assert_eq!(
            machine(Some(Decimal::new(320000, 0))).price_display(),
            "USD 320,000"
        );
        assert_eq!(
            machine(Some(Decimal::new(125050, 2))).price_display(),
            "USD 1,250.50"
        );
        assert_eq!(machine(Some(Decimal::new(999, 0))).price_display(), "USD 999");
    }

    #[test]
    fn feature_list_skips_blank_lines_and_bullets() {
        assert_eq!(
            machine(None).feature_list(),
            ["Adaptive torch", "Cycle analytics", "Tool-less swaps"]
        );
    }

    #[test]
    fn machine_code_is_date_stamped() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let code = machine_code(now);
        assert!(code.starts_with("TNX-20240309-"));
        assert_eq!(code.len(), "TNX-20240309-".len() + 4);
    }

    #[test]
    fn availability_round_trips_through_str() {
        for availability in Availability::ALL {
            assert_eq!(availability.as_str().parse::<Availability>(), Ok(availability));
        }
        assert!("sold_out".parse::<Availability>().is_err());
    }

    #[test]
    fn taxonomy_slug_is_derived_when_blank() {
        let mut category = Category {
            id: 0,
            name: "Automation Lines".to_string(),
            slug: String::new(),
            description: String::new(),
            icon: String::new(),
            display_order: 1,
        };
        category.prepare().unwrap();
        assert_eq!(category.slug, "automation-lines");

        let mut industry = Industry {
            id: 0,
            name: "Food & Beverage".to_string(),
            slug: "F&B Custom".to_string(),
            description: String::new(),
            icon: String::new(),
            feature_statement: String::new(),
            display_order: 0,
        };
        industry.prepare().unwrap();
        assert_eq!(industry.slug, "fb-custom");
    }

    #[test]
    fn unsluggable_name_is_a_name_error() {
        let mut category = Category {
            id: 0,
            name: "???".to_string(),
            slug: String::new(),
            description: String::new(),
            icon: String::new(),
            display_order: 0,
        };
        let errors = category.prepare().unwrap_err();
        assert!(errors.contains("name"));
    }
}
