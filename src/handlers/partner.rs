use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Role};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobTab {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

impl JobTab {
    fn includes(&self, status: BookingStatus) -> bool {
        match self {
            JobTab::Upcoming => matches!(status, BookingStatus::Confirmed | BookingStatus::PartnerAssigned),
            JobTab::Ongoing => status == BookingStatus::Started,
            JobTab::Completed => status == BookingStatus::Completed,
        }
    }
}

#[derive(Deserialize)]
pub struct JobsQuery {
    #[serde(default)]
    pub tab: JobTab,
}

// GET /api/partner/jobs?tab=
//
// Upcoming also lists confirmed jobs nobody has been assigned to yet.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<JobsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let caller = state.authorize(&headers, &[Role::Partner])?;
    let bookings = {
        let db = state.db()?;
        queries::list_bookings(&db, None)?
    };

    let jobs = bookings
        .into_iter()
        .filter(|b| query.tab.includes(b.status))
        .filter(|b| match b.partner_id.as_deref() {
            Some(partner_id) => partner_id == caller.user.id,
            None => b.status == BookingStatus::Confirmed,
        })
        .collect();
    Ok(Json(jobs))
}

fn advance(state: &AppState, partner_id: &str, id: &str, to: BookingStatus) -> Result<Booking, AppError> {
    let db = state.db()?;
    let booking = queries::get_booking(&db, id)?
        .filter(|b| b.partner_id.as_deref() == Some(partner_id))
        .ok_or_else(|| AppError::NotFound(format!("job {id}")))?;

    if !booking.status.can_transition_to(to) {
        return Err(AppError::transition(booking.status, to));
    }

    match to {
        BookingStatus::Completed => queries::complete_booking(&db, id)?,
        _ => queries::update_booking_status(&db, id, to)?,
    };
    tracing::info!(booking_id = %id, partner_id, status = to.as_str(), "job updated");

    queries::get_booking(&db, id)?.ok_or_else(|| AppError::NotFound(format!("job {id}")))
}

// POST /api/partner/jobs/:id/start
pub async fn start_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let caller = state.authorize(&headers, &[Role::Partner])?;
    Ok(Json(advance(&state, &caller.user.id, &id, BookingStatus::Started)?))
}

// POST /api/partner/jobs/:id/complete
pub async fn complete_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let caller = state.authorize(&headers, &[Role::Partner])?;
    Ok(Json(advance(&state, &caller.user.id, &id, BookingStatus::Completed)?))
}
