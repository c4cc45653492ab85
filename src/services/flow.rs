use serde::{Deserialize, Serialize};

use crate::models::BookingDraft;

/// Screens of the customer booking sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    ServiceSelection,
    Scheduling,
    AddressSelection,
    Summary,
    Confirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Service,
    Date,
    Slot,
    Address,
    PaymentMethod,
}

impl DraftField {
    fn is_set(&self, draft: &BookingDraft) -> bool {
        match self {
            DraftField::Service => draft.service().is_some(),
            DraftField::Date => draft.selected_date().is_some(),
            DraftField::Slot => draft.selected_slot().is_some(),
            DraftField::Address => draft.address().is_some(),
            DraftField::PaymentMethod => draft.payment_method().is_some(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Service => "service",
            DraftField::Date => "date",
            DraftField::Slot => "slot",
            DraftField::Address => "address",
            DraftField::PaymentMethod => "payment_method",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot proceed to {}: missing {}", .step.as_str(), field_list(.missing))]
pub struct MissingPrerequisite {
    pub step: FlowStep,
    pub missing: Vec<DraftField>,
}

fn field_list(fields: &[DraftField]) -> String {
    fields.iter().map(DraftField::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepEntry {
    pub step: FlowStep,
    pub redirected: bool,
}

impl FlowStep {
    pub const ALL: [FlowStep; 5] = [
        FlowStep::ServiceSelection,
        FlowStep::Scheduling,
        FlowStep::AddressSelection,
        FlowStep::Summary,
        FlowStep::Confirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::ServiceSelection => "service_selection",
            FlowStep::Scheduling => "scheduling",
            FlowStep::AddressSelection => "address_selection",
            FlowStep::Summary => "summary",
            FlowStep::Confirmation => "confirmation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_str() == s)
    }

    /// Front-end route of the step.
    pub fn path(&self) -> &'static str {
        match self {
            FlowStep::ServiceSelection => "/customer",
            FlowStep::Scheduling => "/customer/booking/schedule",
            FlowStep::AddressSelection => "/customer/booking/address",
            FlowStep::Summary => "/customer/booking/summary",
            FlowStep::Confirmation => "/customer/booking/confirmation",
        }
    }

    /// Only the gated booking screens map back to a step.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/customer/booking/schedule" => Some(FlowStep::Scheduling),
            "/customer/booking/address" => Some(FlowStep::AddressSelection),
            "/customer/booking/summary" => Some(FlowStep::Summary),
            "/customer/booking/confirmation" => Some(FlowStep::Confirmation),
            _ => None,
        }
    }

    /// Draft data required before the step may be shown.
    pub fn entry_requirements(&self) -> &'static [DraftField] {
        match self {
            FlowStep::ServiceSelection => &[],
            FlowStep::Scheduling => &[DraftField::Service],
            FlowStep::AddressSelection => &[DraftField::Slot],
            FlowStep::Summary => &[DraftField::Service, DraftField::Slot, DraftField::Address],
            FlowStep::Confirmation => &[
                DraftField::Service,
                DraftField::Slot,
                DraftField::Address,
                DraftField::PaymentMethod,
            ],
        }
    }

    /// Draft data the step must have produced before leaving it.
    pub fn exit_requirements(&self) -> &'static [DraftField] {
        match self {
            FlowStep::ServiceSelection => &[DraftField::Service],
            FlowStep::Scheduling => &[DraftField::Date, DraftField::Slot],
            FlowStep::AddressSelection => &[DraftField::Address],
            FlowStep::Summary => &[DraftField::PaymentMethod],
            FlowStep::Confirmation => &[],
        }
    }

    pub fn successor(&self) -> Option<FlowStep> {
        match self {
            FlowStep::ServiceSelection => Some(FlowStep::Scheduling),
            FlowStep::Scheduling => Some(FlowStep::AddressSelection),
            FlowStep::AddressSelection => Some(FlowStep::Summary),
            FlowStep::Summary => Some(FlowStep::Confirmation),
            FlowStep::Confirmation => None,
        }
    }
}

fn missing(fields: &[DraftField], draft: &BookingDraft) -> Vec<DraftField> {
    fields.iter().copied().filter(|f| !f.is_set(draft)).collect()
}

pub fn check(step: FlowStep, draft: &BookingDraft) -> Result<(), MissingPrerequisite> {
    let missing = missing(step.entry_requirements(), draft);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingPrerequisite { step, missing })
    }
}

/// Entering a step whose prerequisites are unmet lands on service selection
/// instead of failing.
pub fn enter(step: FlowStep, draft: &BookingDraft) -> StepEntry {
    match check(step, draft) {
        Ok(()) => StepEntry {
            step,
            redirected: false,
        },
        Err(err) => {
            tracing::debug!(step = step.as_str(), error = %err, "redirecting to service selection");
            StepEntry {
                step: FlowStep::ServiceSelection,
                redirected: true,
            }
        }
    }
}

/// Forward transition. Confirmation is terminal and stays put.
pub fn next(step: FlowStep, draft: &BookingDraft) -> Result<FlowStep, MissingPrerequisite> {
    let Some(target) = step.successor() else {
        return Ok(step);
    };

    let mut missing = missing(step.exit_requirements(), draft);
    for field in missing_for(target, draft) {
        if !missing.contains(&field) {
            missing.push(field);
        }
    }

    if missing.is_empty() {
        Ok(target)
    } else {
        Err(MissingPrerequisite {
            step: target,
            missing,
        })
    }
}

fn missing_for(step: FlowStep, draft: &BookingDraft) -> Vec<DraftField> {
    missing(step.entry_requirements(), draft)
}

/// Going back is always allowed and never touches the draft.
pub fn back(step: FlowStep) -> FlowStep {
    match step {
        FlowStep::ServiceSelection | FlowStep::Scheduling => FlowStep::ServiceSelection,
        FlowStep::AddressSelection => FlowStep::Scheduling,
        FlowStep::Summary => FlowStep::AddressSelection,
        FlowStep::Confirmation => FlowStep::Summary,
    }
}

/// Furthest step the draft can currently be shown at.
pub fn furthest_step(draft: &BookingDraft) -> FlowStep {
    let mut step = FlowStep::ServiceSelection;
    while let Ok(target) = next(step, draft) {
        if target == step {
            break;
        }
        step = target;
    }
    step
}
