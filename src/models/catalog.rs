use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub services_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    /// Whole rupees.
    pub price: i64,
    pub duration_minutes: i32,
    pub inclusions: Vec<String>,
    pub rating: f64,
    pub reviews_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub service_id: String,
    pub name: String,
    pub price: i64,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    /// Display label, e.g. "09:00 AM".
    pub time: String,
    pub starts_at: NaiveTime,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub full_address: String,
    pub city: String,
    pub pincode: String,
    pub landmark: Option<String>,
    pub is_default: bool,
}

/// Body of the saved-address form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub landmark: Option<String>,
}

impl AddressForm {
    pub fn validate(&self) -> Result<(), Vec<&'static str>> {
        let required = [
            ("label", &self.label),
            ("full_address", &self.full_address),
            ("city", &self.city),
            ("pincode", &self.pincode),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// Empty landmark input is stored as no landmark.
    pub fn landmark(&self) -> Option<String> {
        self.landmark
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Dates a booking can be scheduled on: `today` and the following days.
pub fn booking_dates(today: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    (0..window_days as i64)
        .map(|offset| today + Duration::days(offset))
        .collect()
}

pub fn is_within_window(date: NaiveDate, today: NaiveDate, window_days: u32) -> bool {
    date >= today && date < today + Duration::days(window_days as i64)
}
