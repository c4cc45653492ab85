use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::services::gateway::BookingGateway;
use crate::services::identity::IdentityProvider;
use crate::services::inflight::InFlight;
use crate::services::location::Geolocator;
use crate::services::otp::{OtpSender, OtpStore};
use crate::services::session::SessionStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub sessions: Mutex<SessionStore>,
    pub otps: Mutex<OtpStore>,
    pub in_flight: InFlight,
    pub identity: Box<dyn IdentityProvider>,
    pub otp_sender: Box<dyn OtpSender>,
    pub gateway: Box<dyn BookingGateway>,
    pub geolocator: Box<dyn Geolocator>,
}

/// The caller of a request, resolved from its bearer token.
#[derive(Debug, Clone)]
pub struct Caller {
    pub token: String,
    pub user: User,
}

impl AppState {
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("database lock poisoned")))
    }

    pub fn sessions(&self) -> Result<MutexGuard<'_, SessionStore>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("session lock poisoned")))
    }

    pub fn otps(&self) -> Result<MutexGuard<'_, OtpStore>, AppError> {
        self.otps
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("otp lock poisoned")))
    }

    /// Resolves the session behind the `Authorization: Bearer` header.
    pub fn caller(&self, headers: &HeaderMap) -> Result<Caller, AppError> {
        let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
        let sessions = self.sessions()?;
        let session = sessions.get(token).ok_or(AppError::Unauthorized)?;
        Ok(Caller {
            token: token.to_string(),
            user: session.user.clone(),
        })
    }

    /// Like `caller`, but the session's role must be one of `allowed`.
    pub fn authorize(&self, headers: &HeaderMap, allowed: &[Role]) -> Result<Caller, AppError> {
        let caller = self.caller(headers)?;
        if allowed.contains(&caller.user.role) {
            Ok(caller)
        } else {
            Err(AppError::Forbidden {
                home: caller.user.role.home_path().to_string(),
            })
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
