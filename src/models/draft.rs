use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AddOn, Address, PaymentMethod, Service, TimeSlot};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("time slot {slot_id} is not available")]
    InvalidSlot { slot_id: String },

    #[error("no service selected")]
    NoServiceSelected,

    #[error("add-on {add_on_id} does not belong to the selected service")]
    AddOnServiceMismatch { add_on_id: String },
}

/// The in-progress booking selection of one session.
///
/// Fields are only reachable through the mutation methods so the clearing
/// rules hold: a new service drops its add-ons, a new date drops the slot.
/// Every mutation bumps `revision`, which lets an in-flight confirmation
/// notice the draft moved underneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingDraft {
    service: Option<Service>,
    add_ons: Vec<AddOn>,
    selected_date: Option<NaiveDate>,
    selected_slot: Option<TimeSlot>,
    address: Option<Address>,
    payment_method: Option<PaymentMethod>,
    revision: u64,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn add_ons(&self) -> &[AddOn] {
        &self.add_ons
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_slot(&self) -> Option<&TimeSlot> {
        self.selected_slot.as_ref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Reselecting the same service still clears the add-ons.
    pub fn set_service(&mut self, service: Service) {
        self.service = Some(service);
        self.add_ons.clear();
        self.touch();
    }

    pub fn add_add_on(&mut self, add_on: AddOn) -> Result<(), DraftError> {
        let service = self.service.as_ref().ok_or(DraftError::NoServiceSelected)?;
        if add_on.service_id != service.id {
            return Err(DraftError::AddOnServiceMismatch {
                add_on_id: add_on.id,
            });
        }
        if self.has_add_on(&add_on.id) {
            return Ok(());
        }
        self.add_ons.push(add_on);
        self.touch();
        Ok(())
    }

    pub fn remove_add_on(&mut self, add_on_id: &str) {
        let before = self.add_ons.len();
        self.add_ons.retain(|a| a.id != add_on_id);
        if self.add_ons.len() != before {
            self.touch();
        }
    }

    pub fn has_add_on(&self, add_on_id: &str) -> bool {
        self.add_ons.iter().any(|a| a.id == add_on_id)
    }

    /// A slot only means something on the date it was picked for.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.selected_date = Some(date);
        self.selected_slot = None;
        self.touch();
    }

    pub fn set_slot(&mut self, slot: TimeSlot) -> Result<(), DraftError> {
        if !slot.available {
            return Err(DraftError::InvalidSlot { slot_id: slot.id });
        }
        self.selected_slot = Some(slot);
        self.touch();
        Ok(())
    }

    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
        self.touch();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
        self.touch();
    }

    /// Pre-tax subtotal: service price plus add-ons, 0 without a service.
    pub fn total(&self) -> i64 {
        match &self.service {
            Some(service) => service.price + self.add_ons.iter().map(|a| a.price).sum::<i64>(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.add_ons.is_empty()
            && self.selected_date.is_none()
            && self.selected_slot.is_none()
            && self.address.is_none()
            && self.payment_method.is_none()
    }

    pub fn reset(&mut self) {
        let revision = self.revision;
        *self = Self::default();
        self.revision = revision;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveTime;

    use super::*;

    pub fn service(id: &str, price: i64) -> Service {
        Service {
            id: id.to_string(),
            category_id: "cat-1".to_string(),
            name: format!("Service {id}"),
            description: String::new(),
            price,
            duration_minutes: 60,
            inclusions: vec![],
            rating: 4.5,
            reviews_count: 10,
        }
    }

    pub fn add_on(id: &str, service_id: &str, price: i64) -> AddOn {
        AddOn {
            id: id.to_string(),
            service_id: service_id.to_string(),
            name: format!("Add-on {id}"),
            price,
            duration_minutes: 15,
        }
    }

    pub fn slot(id: &str, available: bool) -> TimeSlot {
        TimeSlot {
            id: id.to_string(),
            time: "10:00 AM".to_string(),
            starts_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            available,
        }
    }

    pub fn address(id: &str) -> Address {
        Address {
            id: id.to_string(),
            user_id: "1".to_string(),
            label: "Home".to_string(),
            full_address: "42, 3rd Cross".to_string(),
            city: "Bangalore".to_string(),
            pincode: "560034".to_string(),
            landmark: None,
            is_default: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_total_without_service_is_zero() {
        let draft = BookingDraft::new();
        assert_eq!(draft.total(), 0);
    }

    #[test]
    fn test_total_tracks_add_ons() {
        let mut draft = BookingDraft::new();
        draft.set_service(service("svc-1", 2499));
        draft.add_add_on(add_on("a1", "svc-1", 299)).unwrap();
        draft.add_add_on(add_on("a2", "svc-1", 599)).unwrap();
        assert_eq!(draft.total(), 2499 + 299 + 599);

        draft.remove_add_on("a1");
        assert_eq!(draft.total(), 2499 + 599);

        draft.remove_add_on("missing");
        assert_eq!(draft.total(), 2499 + 599);
    }

    #[test]
    fn test_duplicate_add_on_counted_once() {
        let mut draft = BookingDraft::new();
        draft.set_service(service("svc-1", 1000));
        draft.add_add_on(add_on("a1", "svc-1", 100)).unwrap();
        draft.add_add_on(add_on("a1", "svc-1", 100)).unwrap();
        assert_eq!(draft.add_ons().len(), 1);
        assert_eq!(draft.total(), 1100);
    }

    #[test]
    fn test_add_on_must_match_service() {
        let mut draft = BookingDraft::new();
        assert_eq!(
            draft.add_add_on(add_on("a1", "svc-1", 100)),
            Err(DraftError::NoServiceSelected)
        );

        draft.set_service(service("svc-2", 500));
        let err = draft.add_add_on(add_on("a1", "svc-1", 100)).unwrap_err();
        assert!(matches!(err, DraftError::AddOnServiceMismatch { .. }));
        assert!(draft.add_ons().is_empty());
    }

    #[test]
    fn test_set_service_clears_add_ons_even_when_reselected() {
        let mut draft = BookingDraft::new();
        draft.set_service(service("svc-1", 1000));
        draft.add_add_on(add_on("a1", "svc-1", 100)).unwrap();

        draft.set_service(service("svc-1", 1000));
        assert!(draft.add_ons().is_empty());

        draft.add_add_on(add_on("a1", "svc-1", 100)).unwrap();
        draft.set_service(service("svc-2", 700));
        assert!(draft.add_ons().is_empty());
        assert_eq!(draft.total(), 700);
    }

    #[test]
    fn test_set_date_always_clears_slot() {
        let mut draft = BookingDraft::new();
        draft.set_date(date("2025-06-16"));
        draft.set_slot(slot("slot-1", true)).unwrap();

        // Same date again still drops the slot.
        draft.set_date(date("2025-06-16"));
        assert!(draft.selected_slot().is_none());

        draft.set_slot(slot("slot-1", true)).unwrap();
        draft.set_date(date("2025-06-17"));
        assert!(draft.selected_slot().is_none());
        assert_eq!(draft.selected_date(), Some(date("2025-06-17")));
    }

    #[test]
    fn test_unavailable_slot_rejected_and_previous_kept() {
        let mut draft = BookingDraft::new();
        draft.set_slot(slot("slot-1", true)).unwrap();

        let err = draft.set_slot(slot("slot-3", false)).unwrap_err();
        assert_eq!(
            err,
            DraftError::InvalidSlot {
                slot_id: "slot-3".to_string()
            }
        );
        assert_eq!(draft.selected_slot().map(|s| s.id.as_str()), Some("slot-1"));
    }

    #[test]
    fn test_reset_restores_empty_state() {
        let mut draft = BookingDraft::new();
        draft.set_service(service("svc-1", 2499));
        draft.add_add_on(add_on("a1", "svc-1", 299)).unwrap();
        draft.set_date(date("2025-06-16"));
        draft.set_slot(slot("slot-1", true)).unwrap();
        draft.set_address(address("addr-1"));
        draft.set_payment_method(PaymentMethod::Upi);

        draft.reset();
        assert!(draft.is_empty());
        assert_eq!(draft.total(), 0);
    }

    #[test]
    fn test_revision_moves_on_every_mutation() {
        let mut draft = BookingDraft::new();
        let start = draft.revision();
        draft.set_service(service("svc-1", 100));
        assert!(draft.revision() > start);

        let before_reset = draft.revision();
        draft.reset();
        assert!(draft.revision() > before_reset);

        let before_noop = draft.revision();
        draft.remove_add_on("absent");
        assert_eq!(draft.revision(), before_noop);
    }
}
