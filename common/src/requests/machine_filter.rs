use crate::forms::{Cleaner, FieldErrors};
use crate::model::catalogue::Availability;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub const POWER_ORDER_ERROR: &str = "Max kW must be greater than min kW.";

/// Catalogue narrowing criteria taken from the listing query string.
///
/// Every supplied criterion must hold; `search` matches when any of the text
/// columns contains it, ignoring case. Power bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineFilter {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub industry_id: Option<i64>,
    pub availability: Option<Availability>,
    pub financing: bool,
    pub power_min: Option<Decimal>,
    pub power_max: Option<Decimal>,
}

impl MachineFilter {
    pub fn clean(
        query: &HashMap<String, String>,
        category_exists: impl Fn(i64) -> bool,
        industry_exists: impl Fn(i64) -> bool,
    ) -> Result<Self, FieldErrors> {
        let mut cleaner = Cleaner::new(query);
        let search = Some(cleaner.text("search", false, 200)).filter(|s| !s.is_empty());
        let category_id = cleaner.choice_id("category", category_exists);
        let industry_id = cleaner.choice_id("industry", industry_exists);
        let availability = cleaner.choice::<Availability>("availability");
        let financing = cleaner.flag("financing");
        let power_min = cleaner.decimal("power_min", 7, 2);
        let power_max = cleaner.decimal("power_max", 7, 2);

        if let (Some(min), Some(max)) = (power_min, power_max) {
            if min > max {
                cleaner.error("power_max", POWER_ORDER_ERROR);
            }
        }

        cleaner.finish(Self {
            search,
            category_id,
            industry_id,
            availability,
            financing,
            power_min,
            power_max,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
