use chrono::Utc;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ProfileUpdate, Role, User};
use crate::services::identity::Identity;
use crate::state::AppState;

fn parse_identity(raw: &str) -> Result<Identity, AppError> {
    Identity::parse(raw).ok_or_else(|| AppError::validation(["identity"]))
}

pub async fn request_otp(state: &AppState, raw_identity: &str) -> Result<(), AppError> {
    let identity = parse_identity(raw_identity)?;
    let _ticket = state
        .in_flight
        .try_begin(format!("otp:{}", identity.as_str()))
        .ok_or(AppError::Busy)?;

    let code = state.otps()?.issue(
        &state.config.otp_secret,
        identity.as_str(),
        Utc::now().naive_utc(),
        state.config.otp_ttl_secs,
    )?;

    state.otp_sender.send_code(identity.as_str(), &code).await?;
    Ok(())
}

/// Verifies the one-time code and opens a session. The role comes from the
/// identity provider, never from the client.
pub async fn login(
    state: &AppState,
    raw_identity: &str,
    credential: &str,
) -> Result<(String, User), AppError> {
    let identity = parse_identity(raw_identity)?;
    let _ticket = state
        .in_flight
        .try_begin(format!("login:{}", identity.as_str()))
        .ok_or(AppError::Busy)?;

    tokio::time::sleep(state.config.login_delay()).await;

    let verified = state
        .otps()?
        .verify(identity.as_str(), credential, Utc::now().naive_utc());
    if !verified {
        tracing::warn!(identity = identity.as_str(), "rejected one-time code");
        return Err(AppError::Unauthorized);
    }

    let user = state.identity.resolve(&identity).await?;
    let token = state.sessions()?.open(user.clone());
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "signed in");
    Ok((token, user))
}

/// Role-picker login for demos: signs in as the seeded account of `role`.
pub fn demo_login(state: &AppState, role: Role) -> Result<(String, User), AppError> {
    if !state.config.demo_mode {
        return Err(AppError::NotFound("demo login is disabled".to_string()));
    }

    let user = {
        let db = state.db()?;
        queries::find_demo_user(&db, role)?
    }
    .ok_or_else(|| AppError::NotFound(format!("no demo {} account", role.as_str())))?;

    let token = state.sessions()?.open(user.clone());
    tracing::info!(user_id = %user.id, role = role.as_str(), "demo sign-in");
    Ok((token, user))
}

pub fn logout(state: &AppState, token: &str) -> Result<bool, AppError> {
    let closed = state.sessions()?.close(token);
    if let Some(session) = &closed {
        tracing::info!(user_id = %session.user.id, "signed out");
    }
    Ok(closed.is_some())
}

pub fn set_role(state: &AppState, token: &str, role: Role) -> Result<User, AppError> {
    let mut sessions = state.sessions()?;
    let user = sessions.set_role(token, role).ok_or(AppError::Unauthorized)?;
    tracing::info!(user_id = %user.id, role = role.as_str(), "role overridden");
    Ok(user.clone())
}

pub async fn update_profile(
    state: &AppState,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<User, AppError> {
    update.validate().map_err(AppError::validation)?;

    let _ticket = state
        .in_flight
        .try_begin(format!("profile:{user_id}"))
        .ok_or(AppError::Busy)?;

    tokio::time::sleep(state.config.login_delay()).await;

    let email = update
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let user = {
        let db = state.db()?;
        queries::update_profile(&db, user_id, update.name.trim(), email)?
    }
    .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    state.sessions()?.refresh_user(&user);
    Ok(user)
}
