use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Address, AddressForm, Role};
use crate::state::AppState;

// GET /api/addresses
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Address>>, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    let db = state.db()?;
    Ok(Json(queries::list_addresses(&db, &caller.user.id)?))
}

// POST /api/addresses
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<AddressForm>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    form.validate().map_err(AppError::validation)?;

    let db = state.db()?;
    let address = queries::create_address(&db, &caller.user.id, &form)?;
    tracing::info!(address_id = %address.id, user_id = %caller.user.id, "address saved");
    Ok((StatusCode::CREATED, Json(address)))
}

// PUT /api/addresses/:id
pub async fn update_address(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(form): Json<AddressForm>,
) -> Result<Json<Address>, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    form.validate().map_err(AppError::validation)?;

    let db = state.db()?;
    queries::update_address(&db, &caller.user.id, &id, &form)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))
}

// DELETE /api/addresses/:id
pub async fn delete_address(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    let db = state.db()?;
    if !queries::delete_address(&db, &caller.user.id, &id)? {
        return Err(AppError::NotFound(format!("address {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/addresses/:id/default
pub async fn set_default_address(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<Address>>, AppError> {
    let caller = state.authorize(&headers, &[Role::Customer])?;
    let db = state.db()?;
    if !queries::set_default_address(&db, &caller.user.id, &id)? {
        return Err(AppError::NotFound(format!("address {id}")));
    }
    Ok(Json(queries::list_addresses(&db, &caller.user.id)?))
}
