use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, ReviewInput, Role, User};
use crate::state::AppState;

/// Customers see their own bookings, partners the jobs assigned to them,
/// admins everything. Anything else is reported as missing.
fn visible_to(user: &User, booking: &Booking) -> bool {
    match user.role {
        Role::Customer => booking.customer_id == user.id,
        Role::Partner => booking.partner_id.as_deref() == Some(user.id.as_str()),
        Role::Admin => true,
    }
}

fn load_own(state: &AppState, user: &User, id: &str) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db()?;
        queries::get_booking(&db, id)?
    };
    booking
        .filter(|b| visible_to(user, b))
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

fn not_reviewable(booking: &Booking) -> AppError {
    AppError::InvalidTransition {
        from: booking.status.as_str().to_string(),
        to: "reviewed".to_string(),
    }
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    let db = state.db()?;
    Ok(Json(queries::list_bookings_for_customer(&db, &caller.user.id)?))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let caller = state.caller(&headers)?;
    Ok(Json(load_own(&state, &caller.user, &id)?))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer, Role::Admin])?;

    // The guard is held from the status check through the write.
    let db = state.db()?;
    let booking = queries::get_booking(&db, &id)?
        .filter(|b| visible_to(&caller.user, b))
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    if !booking.status.can_transition_to(BookingStatus::Cancelled)
        || !queries::cancel_booking(&db, &id)?
    {
        return Err(AppError::transition(booking.status, BookingStatus::Cancelled));
    }
    tracing::info!(booking_id = %id, by = %caller.user.id, "booking cancelled");

    queries::get_booking(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// POST /api/bookings/:id/review
pub async fn review_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ReviewInput>,
) -> Result<Json<Booking>, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    payload.validate().map_err(|_| AppError::validation(["rating"]))?;

    let booking = load_own(&state, &caller.user, &id)?;
    if !booking.is_reviewable() {
        return Err(not_reviewable(&booking));
    }

    let db = state.db()?;
    let review = payload.review.as_deref().map(str::trim).filter(|r| !r.is_empty());
    if !queries::save_review(&db, &id, payload.rating, review)? {
        return Err(not_reviewable(&booking));
    }
    tracing::info!(booking_id = %id, rating = payload.rating, "review saved");

    queries::get_booking(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}
