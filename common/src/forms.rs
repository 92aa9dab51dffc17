//! Field-scoped validation shared by the public forms and the admin payloads.
//!
//! Submitted forms arrive as flat `name -> value` maps (url-encoded bodies,
//! multipart text parts or query strings). A [`Cleaner`] walks those values,
//! converts them into typed data and records every problem against the field
//! that caused it, so a page can re-render the form with messages next to the
//! offending inputs.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(value)` when nothing was recorded, the errors otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Turns raw submitted values into typed fields, collecting errors as it goes.
pub struct Cleaner<'a> {
    data: &'a HashMap<String, String>,
    errors: FieldErrors,
}

impl<'a> Cleaner<'a> {
    pub fn new(data: &'a HashMap<String, String>) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
        }
    }

    fn raw(&self, field: &str) -> &'a str {
        let data: &'a HashMap<String, String> = self.data;
        data.get(field).map(|v| v.trim()).unwrap_or("")
    }

    /// Trimmed text, optionally required, bounded to `max_len` characters.
    pub fn text(&mut self, field: &str, required: bool, max_len: usize) -> String {
        let value = self.raw(field).to_string();
        if value.is_empty() {
            if required {
                self.errors.add(field, REQUIRED);
            }
            return value;
        }
        let len = value.chars().count();
        if len > max_len {
            self.errors.add(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max_len, len
                ),
            );
        }
        value
    }

    /// Free text without a length bound (descriptions, answers).
    pub fn long_text(&mut self, field: &str, required: bool) -> String {
        self.text(field, required, usize::MAX)
    }

    pub fn email(&mut self, field: &str, required: bool) -> String {
        let value = self.text(field, required, 254);
        if !value.is_empty() && !is_valid_email(&value) {
            self.errors.add(field, "Enter a valid email address.");
        }
        value
    }

    /// Optional non-negative decimal limited to `max_digits` total digits and
    /// `decimal_places` fractional digits.
    pub fn decimal(&mut self, field: &str, max_digits: u32, decimal_places: u32) -> Option<Decimal> {
        let raw = self.raw(field);
        if raw.is_empty() {
            return None;
        }
        let value = match Decimal::from_str(raw) {
            Ok(value) => value.normalize(),
            Err(_) => {
                self.errors.add(field, "Enter a number.");
                return None;
            }
        };
        if value.is_sign_negative() && !value.is_zero() {
            self.errors
                .add(field, "Ensure this value is greater than or equal to 0.");
            return None;
        }
        if value.scale() > decimal_places {
            self.errors.add(
                field,
                format!(
                    "Ensure that there are no more than {} decimal places.",
                    decimal_places
                ),
            );
            return None;
        }
        let integer_digits = value.trunc().abs().to_string().trim_start_matches('0').len() as u32;
        if integer_digits > max_digits - decimal_places {
            self.errors.add(
                field,
                format!(
                    "Ensure that there are no more than {} digits before the decimal point.",
                    max_digits - decimal_places
                ),
            );
            return None;
        }
        Some(value)
    }

    /// Optional reference to another record; `exists` decides whether the id
    /// points at something real.
    pub fn choice_id(&mut self, field: &str, exists: impl Fn(i64) -> bool) -> Option<i64> {
        let raw = self.raw(field);
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(id) if exists(id) => Some(id),
            _ => {
                self.errors.add(field, INVALID_CHOICE);
                None
            }
        }
    }

    /// Optional value restricted to a fixed set; blank yields `None`.
    pub fn choice<T: FromStr>(&mut self, field: &str) -> Option<T> {
        let raw = self.raw(field);
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(
                    field,
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        raw
                    ),
                );
                None
            }
        }
    }

    /// Checkbox semantics: absent, blank, `false`, `off` and `0` are false.
    pub fn flag(&mut self, field: &str) -> bool {
        !matches!(
            self.raw(field).to_ascii_lowercase().as_str(),
            "" | "false" | "off" | "0"
        )
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        self.errors.into_result(value)
    }
}

/// Presence and length checks for values that arrive already typed, such as
/// JSON payloads from the admin API.
pub fn check_text(errors: &mut FieldErrors, field: &str, value: &str, required: bool, max_len: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        if required {
            errors.add(field, REQUIRED);
        }
        return;
    }
    let len = trimmed.chars().count();
    if len > max_len {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max_len, len
            ),
        );
    }
}

/// Loose structural check: a local part, one `@` and a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern compiles")
    });
    EMAIL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn required_text_is_reported() {
        let values = data(&[("name", "   ")]);
        let mut cleaner = Cleaner::new(&values);
        cleaner.text("name", true, 10);
        let errors = cleaner.finish(()).unwrap_err();
        assert_eq!(errors.get("name"), [REQUIRED.to_string()]);
    }

    #[test]
    fn text_longer_than_limit_is_rejected() {
        let values = data(&[("name", "abcdef")]);
        let mut cleaner = Cleaner::new(&values);
        cleaner.text("name", true, 5);
        assert!(cleaner.has_error("name"));
    }

    #[test]
    fn decimal_rules() {
        let values = data(&[
            ("ok", "1250.50"),
            ("negative", "-3"),
            ("precise", "1.234"),
            ("huge", "12345678901"),
            ("junk", "ten"),
        ]);
        let mut cleaner = Cleaner::new(&values);
        assert_eq!(cleaner.decimal("ok", 12, 2), Some(Decimal::new(125050, 2)));
        assert_eq!(cleaner.decimal("negative", 12, 2), None);
        assert_eq!(cleaner.decimal("precise", 12, 2), None);
        assert_eq!(cleaner.decimal("huge", 12, 2), None);
        assert_eq!(cleaner.decimal("junk", 12, 2), None);
        assert_eq!(cleaner.decimal("missing", 12, 2), None);
        let errors = cleaner.finish(()).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["huge", "junk", "negative", "precise"]
        );
    }

    #[test]
    fn flag_follows_checkbox_semantics() {
        let values = data(&[("a", "on"), ("b", "false"), ("c", "true"), ("d", "0")]);
        let mut cleaner = Cleaner::new(&values);
        assert!(cleaner.flag("a"));
        assert!(!cleaner.flag("b"));
        assert!(cleaner.flag("c"));
        assert!(!cleaner.flag("d"));
        assert!(!cleaner.flag("missing"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("buyer@acme-mills.com"));
        assert!(!is_valid_email("buyer@localhost"));
        assert!(!is_valid_email("@acme.com"));
        assert!(!is_valid_email("buyer acme@acme.com"));
        assert!(!is_valid_email("buyer@acme..com"));
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("budget_max", "too small");
        errors.add("email", "bad");
        assert_eq!(errors.to_string(), "budget_max: too small; email: bad");
    }
}
