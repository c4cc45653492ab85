use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::services::location::{self, DetectedLocation};
use crate::state::AppState;

// POST /api/location/detect
pub async fn detect(State(state): State<Arc<AppState>>) -> Json<DetectedLocation> {
    Json(location::detect(state.geolocator.as_ref()).await)
}
