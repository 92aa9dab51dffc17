//! Quote requests submitted by buyers and their status audit trail.
//!
//! A [`CustomRequest`] moves through [`RequestStatus`] values as the sales
//! team works it. Every creation and every change of status leaves exactly one
//! [`RequestStatusLog`] behind; log rows are never edited afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    New,
    Review,
    Quoted,
    Fulfilled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::New,
        RequestStatus::Review,
        RequestStatus::Quoted,
        RequestStatus::Fulfilled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::Review => "review",
            RequestStatus::Quoted => "quoted",
            RequestStatus::Fulfilled => "fulfilled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::New => "New",
            RequestStatus::Review => "Under Review",
            RequestStatus::Quoted => "Quoted",
            RequestStatus::Fulfilled => "Fulfilled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown request status '{}'", s))
    }
}

/// `RQyymmddXXXX`: the creation date followed by four random characters.
pub fn reference_code(now: DateTime<Utc>) -> String {
    format!("RQ{}{}", now.format("%y%m%d"), super::random_code(4))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRequest {
    pub id: i64,
    pub reference_code: String,
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
    /// Uploaded file path relative to the media root.
    pub attachment: Option<String>,
    pub preferred_contact_method: String,
    pub status: RequestStatus,
    pub internal_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomRequest {
    /// `USD 50000.00 - 100000.00`, with `—` standing in for a missing bound.
    pub fn budget_display(&self) -> String {
        let bound = |value: Option<Decimal>| match value {
            Some(mut v) => {
                v.rescale(2);
                v.to_string()
            }
            None => "—".to_string(),
        };
        format!(
            "{} {} - {}",
            self.currency,
            bound(self.budget_min),
            bound(self.budget_max)
        )
    }
}

/// One entry of the append-only status trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatusLog {
    pub id: i64,
    pub request_id: i64,
    pub status: RequestStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reference_code_format() {
        let now = Utc.with_ymd_and_hms(2025, 11, 4, 8, 30, 0).unwrap();
        let code = reference_code(now);
        assert!(code.starts_with("RQ251104"));
        assert_eq!(code.len(), 12);
        assert!(code[8..].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn status_parsing_and_labels() {
        assert_eq!("review".parse::<RequestStatus>(), Ok(RequestStatus::Review));
        assert!("closed".parse::<RequestStatus>().is_err());
        assert_eq!(RequestStatus::Review.label(), "Under Review");
        assert_eq!(
            serde_json::to_string(&RequestStatus::Fulfilled).unwrap(),
            "\"fulfilled\""
        );
    }

    #[test]
    fn budget_display_marks_missing_bounds() {
        let now = Utc::now();
        let mut request = CustomRequest {
            id: 1,
            reference_code: "RQ250101ABCD".to_string(),
            contact_name: "Jane".to_string(),
            company_name: "Acme Mills".to_string(),
            email: "jane@acme.com".to_string(),
            phone: String::new(),
            industry_id: None,
            machine_type: "Press".to_string(),
            capacity_requirement: String::new(),
            budget_min: Some(Decimal::new(5000000, 2)),
            budget_max: None,
            currency: "EUR".to_string(),
            project_location: String::new(),
            deployment_timeline: String::new(),
            description: "Need a press".to_string(),
            attachment: None,
            preferred_contact_method: String::new(),
            status: RequestStatus::New,
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(request.budget_display(), "EUR 50000.00 - —");

        request.budget_min = Some(Decimal::new(50000, 0));
        request.budget_max = Some(Decimal::new(1234567, 3));
        assert_eq!(request.budget_display(), "EUR 50000.00 - 1234.57");
    }
}
