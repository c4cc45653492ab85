use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::flow::{self, FlowStep, StepEntry};
use crate::services::route_guard::{self, RouteDecision};
use crate::state::{bearer_token, AppState};

#[derive(Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

#[derive(Serialize)]
pub struct NavigateResponse {
    pub path: String,
    #[serde(flatten)]
    pub decision: RouteDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepEntry>,
}

// GET /api/navigate?path=
//
// Anonymous callers are allowed; an unknown or expired token counts as signed out.
pub async fn navigate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigateResponse>, AppError> {
    let sessions = state.sessions()?;
    let session = bearer_token(&headers)
        .and_then(|token| sessions.get(token))
        .map(|s| (s.user.clone(), s.draft.clone()));
    drop(sessions);

    let decision = route_guard::guard(session.as_ref().map(|(user, _)| user), &query.path);
    let mut redirect = decision.location().map(str::to_string);

    let step = match (&decision, &session) {
        (RouteDecision::Allow, Some((_, draft))) => {
            FlowStep::from_path(route_guard::normalize(&query.path)).map(|step| {
                let entry = flow::enter(step, draft);
                if entry.redirected {
                    redirect = Some(entry.step.path().to_string());
                }
                entry
            })
        }
        _ => None,
    };

    Ok(Json(NavigateResponse {
        path: query.path,
        decision,
        redirect,
        step,
    }))
}
