use crate::forms::{Cleaner, FieldErrors};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Currencies a buyer can quote a budget in, with their display labels.
pub const CURRENCIES: [(&str, &str); 7] = [
    ("USD", "USD — US Dollar"),
    ("EUR", "EUR — Euro"),
    ("GBP", "GBP — British Pound"),
    ("AED", "AED — UAE Dirham"),
    ("PKR", "PKR — Pakistani Rupee"),
    ("SAR", "SAR — Saudi Riyal"),
    ("CNY", "CNY — Chinese Yuan"),
];

pub const DEFAULT_CURRENCY: &str = "USD";

pub const BUDGET_ORDER_ERROR: &str =
    "Maximum budget must be greater than or equal to minimum budget.";

/// Field names of the request form, in display order.
pub const FIELDS: [&str; 14] = [
    "contact_name",
    "company_name",
    "email",
    "phone",
    "industry",
    "machine_type",
    "capacity_requirement",
    "budget_min",
    "budget_max",
    "currency",
    "project_location",
    "deployment_timeline",
    "description",
    "preferred_contact_method",
];

/// A validated quote request, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomRequestInput {
    pub contact_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub industry_id: Option<i64>,
    pub machine_type: String,
    pub capacity_requirement: String,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub currency: String,
    pub project_location: String,
    pub deployment_timeline: String,
    pub description: String,
    pub preferred_contact_method: String,
}

impl CustomRequestInput {
    /// Validates raw form values.
    ///
    /// `industry_exists` decides whether a submitted industry id refers to a
    /// stored industry. A minimum budget above the maximum is reported on
    /// `budget_max`.
    pub fn clean(
        data: &HashMap<String, String>,
        industry_exists: impl Fn(i64) -> bool,
    ) -> Result<Self, FieldErrors> {
        let mut cleaner = Cleaner::new(data);
        let contact_name = cleaner.text("contact_name", true, 120);
        let company_name = cleaner.text("company_name", true, 150);
        let email = cleaner.email("email", true);
        let phone = cleaner.text("phone", false, 50);
        let industry_id = cleaner.choice_id("industry", industry_exists);
        let machine_type = cleaner.text("machine_type", true, 180);
        let capacity_requirement = cleaner.text("capacity_requirement", false, 180);
        let budget_min = cleaner.decimal("budget_min", 12, 2);
        let budget_max = cleaner.decimal("budget_max", 12, 2);
        let mut currency = cleaner.text("currency", false, 5).to_ascii_uppercase();
        if currency.is_empty() {
            currency = DEFAULT_CURRENCY.to_string();
        } else if !CURRENCIES.iter().any(|(code, _)| *code == currency) {
            cleaner.error(
                "currency",
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    currency
                ),
            );
        }
        let project_location = cleaner.text("project_location", false, 160);
        let deployment_timeline = cleaner.text("deployment_timeline", false, 120);
        let description = cleaner.long_text("description", true);
        let preferred_contact_method = cleaner.text("preferred_contact_method", false, 80);

        if let (Some(min), Some(max)) = (budget_min, budget_max) {
            if min > max {
                cleaner.error("budget_max", BUDGET_ORDER_ERROR);
            }
        }

        cleaner.finish(Self {
            contact_name,
            company_name,
            email,
            phone,
            industry_id,
            machine_type,
            capacity_requirement,
            budget_min,
            budget_max,
            currency,
            project_location,
            deployment_timeline,
            description,
            preferred_contact_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HashMap<String, String> {
        [
            ("contact_name", "Jane Doe"),
            ("company_name", "Acme Mills"),
            ("email", "jane@acme-mills.com"),
            ("machine_type", "Flour roller mill"),
            ("budget_min", "50000"),
            ("budget_max", "100000"),
            ("description", "Two-shift operation, 30 t/day."),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn accepts_a_complete_request() {
        let input = CustomRequestInput::clean(&valid(), |_| true).unwrap();
        assert_eq!(input.company_name, "Acme Mills");
        assert_eq!(input.currency, "USD");
        assert_eq!(input.budget_min, Some(Decimal::new(50000, 0)));
        assert_eq!(input.industry_id, None);
    }

    #[test]
    fn inverted_budget_is_reported_on_maximum() {
        let mut data = valid();
        data.insert("budget_min".into(), "100000".into());
        data.insert("budget_max".into(), "50000".into());
        let errors = CustomRequestInput::clean(&data, |_| true).unwrap_err();
        assert_eq!(errors.get("budget_max"), [BUDGET_ORDER_ERROR.to_string()]);
        assert!(!errors.contains("budget_min"));
    }

    #[test]
    fn equal_budgets_are_fine() {
        let mut data = valid();
        data.insert("budget_min".into(), "75000".into());
        data.insert("budget_max".into(), "75000.00".into());
        assert!(CustomRequestInput::clean(&data, |_| true).is_ok());
    }

    #[test]
    fn missing_required_fields_are_listed() {
        let errors = CustomRequestInput::clean(&HashMap::new(), |_| true).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            ["company_name", "contact_name", "description", "email", "machine_type"]
        );
    }

    #[test]
    fn unknown_industry_and_currency_are_rejected() {
        let mut data = valid();
        data.insert("industry".into(), "42".into());
        data.insert("currency".into(), "XYZ".into());
        let errors = CustomRequestInput::clean(&data, |id| id == 7).unwrap_err();
        assert!(errors.contains("industry"));
        assert!(errors.contains("currency"));

        data.insert("industry".into(), "7".into());
        data.insert("currency".into(), "eur".into());
        let input = CustomRequestInput::clean(&data, |id| id == 7).unwrap();
        assert_eq!(input.industry_id, Some(7));
        assert_eq!(input.currency, "EUR");
    }
}
