use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries::{self, BookingStats};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Role};
use crate::state::AppState;

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    state.authorize(&headers, &[Role::Admin])?;

    let status = match query.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        Some(s) => Some(BookingStatus::parse(s).ok_or_else(|| AppError::validation(["status"]))?),
        None => None,
    };
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let bookings = {
        let db = state.db()?;
        queries::list_bookings(&db, status)?
    };

    let bookings = match needle {
        Some(needle) => bookings
            .into_iter()
            .filter(|b| {
                b.id.to_lowercase().contains(&needle) || b.service.name.to_lowercase().contains(&needle)
            })
            .collect(),
        None => bookings,
    };
    Ok(Json(bookings))
}

// POST /api/admin/bookings/:id/assign
#[derive(Deserialize)]
pub struct AssignRequest {
    pub partner_id: String,
}

pub async fn assign_partner(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<Booking>, AppError> {
    state.authorize(&headers, &[Role::Admin])?;

    let db = state.db()?;
    let partner = queries::get_user(&db, &payload.partner_id)?;
    if partner.map(|p| p.role) != Some(Role::Partner) {
        return Err(AppError::validation(["partner_id"]));
    }

    let booking = queries::get_booking(&db, &id)?.ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    if !booking.status.can_transition_to(BookingStatus::PartnerAssigned) {
        return Err(AppError::transition(booking.status, BookingStatus::PartnerAssigned));
    }

    queries::assign_partner(&db, &id, &payload.partner_id)?;
    tracing::info!(booking_id = %id, partner_id = %payload.partner_id, "partner assigned");

    queries::get_booking(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// GET /api/admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BookingStats>, AppError> {
    state.authorize(&headers, &[Role::Admin])?;
    let db = state.db()?;
    Ok(Json(queries::booking_stats(&db)?))
}
