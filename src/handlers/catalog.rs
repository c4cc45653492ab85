use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{booking_dates, AddOn, Service, ServiceCategory, TimeSlot};
use crate::state::AppState;

// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceCategory>>, AppError> {
    let db = state.db()?;
    Ok(Json(queries::list_categories(&db)?))
}

// GET /api/services?category=
#[derive(Deserialize)]
pub struct ServicesQuery {
    pub category: Option<String>,
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<Vec<Service>>, AppError> {
    let db = state.db()?;
    if let Some(category) = query.category.as_deref() {
        if !queries::category_exists(&db, category)? {
            return Err(AppError::NotFound(format!("category {category}")));
        }
    }
    Ok(Json(queries::list_services(&db, query.category.as_deref())?))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    let db = state.db()?;
    queries::get_service(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))
}

// GET /api/services/:id/add-ons
pub async fn list_add_ons(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AddOn>>, AppError> {
    let db = state.db()?;
    if queries::get_service(&db, &id)?.is_none() {
        return Err(AppError::NotFound(format!("service {id}")));
    }
    Ok(Json(queries::list_add_ons(&db, &id)?))
}

// GET /api/schedule/dates
#[derive(Serialize)]
pub struct DatesResponse {
    pub today: NaiveDate,
    pub dates: Vec<NaiveDate>,
}

pub async fn list_dates(State(state): State<Arc<AppState>>) -> Json<DatesResponse> {
    let today = Local::now().date_naive();
    Json(DatesResponse {
        today,
        dates: booking_dates(today, state.config.booking_window_days),
    })
}

// GET /api/schedule/slots?date=
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let db = state.db()?;
    let now = Local::now().naive_local();
    Ok(Json(queries::list_time_slots(&db, query.date, now)?))
}
