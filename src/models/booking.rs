use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{AddOn, Address, Service};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub partner_id: Option<String>,
    pub service: Service,
    pub add_ons: Vec<AddOn>,
    pub address: Address,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub status: BookingStatus,
    pub subtotal: i64,
    pub tax: i64,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// Completed and not yet rated.
    pub fn is_reviewable(&self) -> bool {
        self.status == BookingStatus::Completed && self.rating.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    PartnerAssigned,
    Started,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::PartnerAssigned => "partner_assigned",
            BookingStatus::Started => "started",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "partner_assigned" => Some(BookingStatus::PartnerAssigned),
            "started" => Some(BookingStatus::Started),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Happy path moves one step forward; cancellation is allowed from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (from, Cancelled) => !from.is_terminal(),
            (Pending, Confirmed)
            | (Confirmed, PartnerAssigned)
            | (PartnerAssigned, Started)
            | (Started, Completed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
    Wallet,
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Cod => "cod",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upi" => Some(PaymentMethod::Upi),
            "card" => Some(PaymentMethod::Card),
            "wallet" => Some(PaymentMethod::Wallet),
            "cod" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }

    /// Cash is collected after the visit; every other method is settled up front.
    pub fn is_prepaid(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), &'static str> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err("rating must be between 1 and 5")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_happy_path_is_monotonic() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(PartnerAssigned));
        assert!(PartnerAssigned.can_transition_to(Started));
        assert!(Started.can_transition_to(Completed));

        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Started));
        assert!(!Completed.can_transition_to(Started));
    }

    #[test]
    fn test_cancel_only_from_non_terminal() {
        for status in [Pending, Confirmed, PartnerAssigned, Started] {
            assert!(status.can_transition_to(Cancelled), "{status:?}");
        }
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BookingStatus::parse("partner_assigned"), Some(PartnerAssigned));
        assert_eq!(BookingStatus::parse("unknown"), None);
        assert_eq!(Started.as_str(), "started");
    }

    #[test]
    fn test_review_rating_bounds() {
        let ok = ReviewInput { rating: 5, review: None };
        let zero = ReviewInput { rating: 0, review: None };
        let six = ReviewInput { rating: 6, review: None };
        assert!(ok.validate().is_ok());
        assert!(zero.validate().is_err());
        assert!(six.validate().is_err());
    }

    #[test]
    fn test_cod_is_not_prepaid() {
        assert!(!PaymentMethod::Cod.is_prepaid());
        assert!(PaymentMethod::Upi.is_prepaid());
        assert_eq!(PaymentMethod::parse("wallet"), Some(PaymentMethod::Wallet));
    }
}
