use chrono::Utc;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingDraft, BookingStatus, User};
use crate::services::flow::{self, DraftField, FlowStep, MissingPrerequisite};
use crate::services::gateway::{BookingRequest, Receipt};
use crate::services::pricing;
use crate::state::AppState;

/// Turns a draft that is ready for confirmation into a gateway request.
pub fn prepare(user: &User, draft: &BookingDraft) -> Result<BookingRequest, AppError> {
    flow::next(FlowStep::Summary, draft)?;

    let missing_date = || MissingPrerequisite {
        step: FlowStep::Confirmation,
        missing: vec![DraftField::Date],
    };

    match (
        draft.service(),
        draft.selected_date(),
        draft.selected_slot(),
        draft.address(),
        draft.payment_method(),
    ) {
        (Some(service), Some(date), Some(slot), Some(address), Some(method)) => Ok(BookingRequest {
            customer_id: user.id.clone(),
            service: service.clone(),
            add_ons: draft.add_ons().to_vec(),
            address: address.clone(),
            scheduled_date: date,
            slot: slot.clone(),
            payment_method: method,
            pricing: pricing::breakdown(draft),
        }),
        _ => Err(missing_date().into()),
    }
}

pub fn into_booking(request: BookingRequest, receipt: Receipt) -> Booking {
    let now = Utc::now().naive_utc();
    Booking {
        id: receipt.reference,
        customer_id: request.customer_id,
        partner_id: None,
        service: request.service,
        add_ons: request.add_ons,
        address: request.address,
        scheduled_date: request.scheduled_date,
        scheduled_time: request.slot.time,
        status: BookingStatus::Confirmed,
        subtotal: request.pricing.subtotal,
        tax: request.pricing.tax,
        total_amount: request.pricing.grand_total,
        payment_method: request.payment_method,
        payment_status: receipt.payment_status,
        rating: None,
        review: None,
        created_at: now,
        updated_at: now,
    }
}

/// Submits the session's draft. Only one confirmation per session may be in
/// flight, and a result that comes back after the draft was changed, reset,
/// or its session closed is dropped instead of being recorded.
pub async fn confirm(state: &AppState, token: &str) -> Result<Booking, AppError> {
    let _ticket = state
        .in_flight
        .try_begin(format!("confirm:{token}"))
        .ok_or(AppError::Busy)?;

    let (request, revision) = {
        let sessions = state.sessions()?;
        let session = sessions.get(token).ok_or(AppError::Unauthorized)?;
        (prepare(&session.user, &session.draft)?, session.draft.revision())
    };

    let receipt = state.gateway.submit(&request).await?;

    let mut sessions = state.sessions()?;
    let Some(session) = sessions.get_mut(token) else {
        tracing::warn!(reference = %receipt.reference, "session closed during confirmation, discarding");
        return Err(AppError::Stale);
    };
    if session.draft.revision() != revision {
        tracing::warn!(reference = %receipt.reference, "draft changed during confirmation, discarding");
        return Err(AppError::Stale);
    }

    let booking = into_booking(request, receipt);
    {
        let db = state.db()?;
        queries::create_booking(&db, &booking)?;
    }
    session.draft.reset();

    tracing::info!(
        booking_id = %booking.id,
        customer_id = %booking.customer_id,
        total = booking.total_amount,
        "booking confirmed"
    );
    Ok(booking)
}
