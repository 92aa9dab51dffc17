//! Data shaped for the templates.
//!
//! Templates only print strings and test booleans; everything that needs a
//! decision (formatting, option handling, selected states) happens here.

use super::flash::Flash;
use common::forms::FieldErrors;
use common::model::catalogue::{Availability, Category, Industry, Machine};
use common::model::settings::SiteSettings;
use common::requests::custom_request::CURRENCIES;
use std::collections::HashMap;

pub fn media_url(path: &str) -> String {
    format!("/media/{}", path.trim_start_matches('/'))
}

/// What the shared page chrome needs.
pub struct Layout {
    pub settings: SiteSettings,
    pub flashes: Vec<Flash>,
    pub hero_background: String,
}

impl Layout {
    pub fn new(settings: SiteSettings, flashes: Vec<Flash>) -> Self {
        let hero_background = settings
            .hero_background
            .as_deref()
            .map(media_url)
            .unwrap_or_default();
        Self {
            settings,
            flashes,
            hero_background,
        }
    }

    pub fn regions(&self) -> Vec<&str> {
        self.settings.regions()
    }
}

pub struct MachineCard {
    pub name: String,
    pub url: String,
    pub public_id: String,
    pub short_description: String,
    pub category: String,
    pub availability: &'static str,
    pub price: String,
    pub power: String,
    pub capacity: String,
    pub highlight: String,
    pub image: String,
    pub featured: bool,
    pub financing: bool,
}

impl MachineCard {
    pub fn new(machine: &Machine, categories: &HashMap<i64, String>) -> Self {
        Self {
            name: machine.name.clone(),
            url: format!("/catalogue/{}/", machine.slug),
            public_id: machine.public_id.clone(),
            short_description: machine.short_description.clone(),
            category: categories
                .get(&machine.category_id)
                .cloned()
                .unwrap_or_default(),
            availability: machine.availability.label(),
            price: machine.price_display(),
            power: machine
                .power_rating_kw
                .map(|kw| format!("{} kW", kw.normalize()))
                .unwrap_or_default(),
            capacity: machine.capacity_output.clone(),
            highlight: machine.highlight_text.clone(),
            image: machine.hero_image.as_deref().map(media_url).unwrap_or_default(),
            featured: machine.is_featured,
            financing: machine.financing_available,
        }
    }

    pub fn list(machines: &[Machine], categories: &[Category]) -> Vec<Self> {
        let names = category_names(categories);
        machines.iter().map(|m| Self::new(m, &names)).collect()
    }
}

pub fn category_names(categories: &[Category]) -> HashMap<i64, String> {
    categories.iter().map(|c| (c.id, c.name.clone())).collect()
}

/// An `<option>` of a select input.
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn choices(
    options: impl IntoIterator<Item = (String, String)>,
    current: &str,
) -> Vec<Choice> {
    options
        .into_iter()
        .map(|(value, label)| Choice {
            selected: value == current,
            value,
            label,
        })
        .collect()
}

/// Submitted values plus field errors, for re-displaying a form.
pub struct FormState {
    pub values: HashMap<String, String>,
    pub errors: FieldErrors,
}

impl FormState {
    pub fn new(values: HashMap<String, String>, errors: FieldErrors) -> Self {
        Self { values, errors }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The quote request form as rendered on the landing, detail and request
/// pages.
pub struct RequestForm {
    pub action: &'static str,
    pub state: FormState,
    pub industries: Vec<Choice>,
    pub currencies: Vec<Choice>,
}

impl RequestForm {
    pub fn new(action: &'static str, state: FormState, industries: &[Industry]) -> Self {
        let industry_choices = choices(
            industries
                .iter()
                .map(|i| (i.id.to_string(), i.name.clone())),
            state.value("industry"),
        );
        let currency = match state.value("currency") {
            "" => "USD".to_string(),
            other => other.to_ascii_uppercase(),
        };
        let currency_choices = choices(
            CURRENCIES
                .iter()
                .map(|(code, label)| (code.to_string(), label.to_string())),
            &currency,
        );
        Self {
            action,
            state,
            industries: industry_choices,
            currencies: currency_choices,
        }
    }

    pub fn blank(action: &'static str, industries: &[Industry]) -> Self {
        Self::new(
            action,
            FormState::new(HashMap::new(), FieldErrors::new()),
            industries,
        )
    }

    /// An unbound form with some fields filled in.
    pub fn with_initial(
        action: &'static str,
        initial: &[(&str, &str)],
        industries: &[Industry],
    ) -> Self {
        let values = initial
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(action, FormState::new(values, FieldErrors::new()), industries)
    }

    pub fn value(&self, field: &str) -> &str {
        self.state.value(field)
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.state.errors_for(field)
    }
}

/// The catalogue filter sidebar.
pub struct FilterForm {
    pub state: FormState,
    pub categories: Vec<Choice>,
    pub industries: Vec<Choice>,
    pub availabilities: Vec<Choice>,
    pub financing: bool,
}

impl FilterForm {
    pub fn new(state: FormState, categories: &[Category], industries: &[Industry]) -> Self {
        let mut categories: Vec<&Category> = categories.iter().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        let mut industries: Vec<&Industry> = industries.iter().collect();
        industries.sort_by(|a, b| a.name.cmp(&b.name));

        let financing = !matches!(
            state.value("financing").to_ascii_lowercase().as_str(),
            "" | "false" | "off" | "0"
        );
        Self {
            categories: choices(
                categories
                    .iter()
                    .map(|c| (c.id.to_string(), c.name.clone())),
                state.value("category"),
            ),
            industries: choices(
                industries
                    .iter()
                    .map(|i| (i.id.to_string(), i.name.clone())),
                state.value("industry"),
            ),
            availabilities: choices(
                Availability::ALL
                    .iter()
                    .map(|a| (a.as_str().to_string(), a.label().to_string())),
                state.value("availability"),
            ),
            financing,
            state,
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.state.value(field)
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.state.errors_for(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn industry(id: i64, name: &str) -> Industry {
        Industry {
            id,
            name: name.to_string(),
            slug: String::new(),
            description: String::new(),
            icon: String::new(),
            feature_statement: String::new(),
            display_order: 0,
        }
    }

    #[test]
    fn request_form_marks_selected_options() {
        let values: HashMap<String, String> = [("industry", "2"), ("currency", "eur")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let form = RequestForm::new(
            "/custom-request/",
            FormState::new(values, FieldErrors::new()),
            &[industry(1, "Automotive"), industry(2, "Energy")],
        );
        let selected: Vec<&str> = form
            .industries
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(selected, ["Energy"]);
        assert!(form.currencies.iter().any(|c| c.selected && c.value == "EUR"));
    }

    #[test]
    fn blank_form_defaults_to_usd() {
        let form = RequestForm::blank("/landing/request/", &[]);
        let selected: Vec<&str> = form
            .currencies
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(selected, ["USD"]);
        assert_eq!(form.value("email"), "");
    }
}
