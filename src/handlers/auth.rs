use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{ProfileUpdate, Role, User};
use crate::services::auth;
use crate::state::{bearer_token, AppState};

#[derive(Deserialize)]
pub struct OtpRequest {
    pub identity: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identity: String,
    pub otp: String,
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub home: &'static str,
    pub user: User,
}

impl SessionResponse {
    fn new(token: String, user: User) -> Self {
        Self {
            token,
            home: user.role.home_path(),
            user,
        }
    }
}

// POST /api/auth/otp
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OtpRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth::request_otp(&state, &payload.identity).await?;
    Ok(Json(serde_json::json!({ "sent": true })))
}

// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (token, user) = auth::login(&state, &payload.identity, &payload.otp).await?;
    Ok(Json(SessionResponse::new(token, user)))
}

// POST /api/auth/demo
pub async fn demo_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (token, user) = auth::demo_login(&state, payload.role)?;
    Ok(Json(SessionResponse::new(token, user)))
}

// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let closed = auth::logout(&state, token)?;
    Ok(Json(serde_json::json!({ "ok": closed })))
}

// PUT /api/auth/role
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<User>, AppError> {
    let caller = state.caller(&headers)?;
    let user = auth::set_role(&state, &caller.token, payload.role)?;
    Ok(Json(user))
}

// GET /api/session
pub async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.caller(&headers)?.user))
}

// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    let caller = state.caller(&headers)?;
    let user = auth::update_profile(&state, &caller.user.id, &payload).await?;
    Ok(Json(user))
}
