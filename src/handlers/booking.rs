//! The booking flow screens, each operating on the caller's session draft.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{is_within_window, Booking, BookingDraft, PaymentMethod, Role};
use crate::services::checkout;
use crate::services::flow::{self, FlowStep, StepEntry};
use crate::services::pricing::{self, PriceBreakdown};
use crate::state::{AppState, Caller};

#[derive(Serialize)]
pub struct DraftView {
    pub draft: BookingDraft,
    pub pricing: PriceBreakdown,
    pub furthest_step: FlowStep,
}

impl DraftView {
    fn of(draft: &BookingDraft) -> Self {
        Self {
            draft: draft.clone(),
            pricing: pricing::breakdown(draft),
            furthest_step: flow::furthest_step(draft),
        }
    }
}

fn customer(state: &AppState, headers: &HeaderMap) -> Result<Caller, AppError> {
    state.authorize(headers, &[Role::Customer])
}

/// Applies `edit` to the caller's draft under the session lock.
fn edit_draft<F>(state: &AppState, caller: &Caller, edit: F) -> Result<DraftView, AppError>
where
    F: FnOnce(&mut BookingDraft) -> Result<(), AppError>,
{
    let mut sessions = state.sessions()?;
    let session = sessions.get_mut(&caller.token).ok_or(AppError::Unauthorized)?;
    edit(&mut session.draft)?;
    Ok(DraftView::of(&session.draft))
}

// GET /api/booking/draft
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let sessions = state.sessions()?;
    let session = sessions.get(&caller.token).ok_or(AppError::Unauthorized)?;
    Ok(Json(DraftView::of(&session.draft)))
}

// DELETE /api/booking/draft
pub async fn reset_draft(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let view = edit_draft(&state, &caller, |draft| {
        draft.reset();
        Ok(())
    })?;
    tracing::debug!(user_id = %caller.user.id, "booking draft reset");
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SelectService {
    pub service_id: String,
}

// PUT /api/booking/draft/service
pub async fn select_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SelectService>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let service = {
        let db = state.db()?;
        queries::get_service(&db, &payload.service_id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("service {}", payload.service_id)))?;

    let view = edit_draft(&state, &caller, |draft| {
        draft.set_service(service);
        Ok(())
    })?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SelectAddOn {
    pub add_on_id: String,
}

// POST /api/booking/draft/add-ons
pub async fn add_add_on(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SelectAddOn>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let add_on = {
        let db = state.db()?;
        queries::get_add_on(&db, &payload.add_on_id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("add-on {}", payload.add_on_id)))?;

    let view = edit_draft(&state, &caller, |draft| Ok(draft.add_add_on(add_on)?))?;
    Ok(Json(view))
}

// DELETE /api/booking/draft/add-ons/:id
pub async fn remove_add_on(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let view = edit_draft(&state, &caller, |draft| {
        draft.remove_add_on(&id);
        Ok(())
    })?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SelectDate {
    pub date: NaiveDate,
}

// PUT /api/booking/draft/date
pub async fn select_date(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SelectDate>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let today = Local::now().date_naive();
    if !is_within_window(payload.date, today, state.config.booking_window_days) {
        return Err(AppError::validation(["date"]));
    }

    let view = edit_draft(&state, &caller, |draft| {
        draft.set_date(payload.date);
        Ok(())
    })?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SelectSlot {
    pub slot_id: String,
}

// PUT /api/booking/draft/slot
pub async fn select_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SelectSlot>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let date = {
        let sessions = state.sessions()?;
        let session = sessions.get(&caller.token).ok_or(AppError::Unauthorized)?;
        session.draft.selected_date()
    }
    .ok_or_else(|| AppError::validation(["date"]))?;

    let slot = {
        let db = state.db()?;
        queries::list_time_slots(&db, date, Local::now().naive_local())?
    }
    .into_iter()
    .find(|slot| slot.id == payload.slot_id)
    .ok_or_else(|| AppError::NotFound(format!("slot {}", payload.slot_id)))?;

    let view = edit_draft(&state, &caller, |draft| {
        // The date may have moved on since the slot list was read.
        if draft.selected_date() != Some(date) {
            return Err(AppError::Stale);
        }
        Ok(draft.set_slot(slot)?)
    })?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SelectAddress {
    pub address_id: String,
}

// PUT /api/booking/draft/address
pub async fn select_address(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SelectAddress>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let address = {
        let db = state.db()?;
        queries::get_address(&db, &caller.user.id, &payload.address_id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("address {}", payload.address_id)))?;

    let view = edit_draft(&state, &caller, |draft| {
        draft.set_address(address);
        Ok(())
    })?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SelectPayment {
    pub method: PaymentMethod,
}

// PUT /api/booking/draft/payment
pub async fn select_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SelectPayment>,
) -> Result<Json<DraftView>, AppError> {
    let caller = customer(&state, &headers)?;
    let view = edit_draft(&state, &caller, |draft| {
        draft.set_payment_method(payload.method);
        Ok(())
    })?;
    Ok(Json(view))
}

// GET /api/booking/steps/:step
pub async fn enter_step(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(step): Path<String>,
) -> Result<Json<StepEntry>, AppError> {
    let caller = customer(&state, &headers)?;
    let step = FlowStep::parse(&step).ok_or_else(|| AppError::NotFound(format!("step {step}")))?;

    let sessions = state.sessions()?;
    let session = sessions.get(&caller.token).ok_or(AppError::Unauthorized)?;
    let entry = flow::enter(step, &session.draft);
    if entry.redirected {
        tracing::debug!(step = step.as_str(), "step prerequisites unmet, redirecting");
    }
    Ok(Json(entry))
}

// POST /api/booking/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let caller = customer(&state, &headers)?;
    let booking = checkout::confirm(&state, &caller.token).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
