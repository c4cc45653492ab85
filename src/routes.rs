use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // auth and session
        .route("/api/auth/otp", post(handlers::auth::send_otp))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/demo", post(handlers::auth::demo_login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/role", put(handlers::auth::set_role))
        .route("/api/session", get(handlers::auth::current_session))
        .route("/api/profile", put(handlers::auth::update_profile))
        .route("/api/navigate", get(handlers::navigation::navigate))
        // catalog
        .route("/api/categories", get(handlers::catalog::list_categories))
        .route("/api/services", get(handlers::catalog::list_services))
        .route("/api/services/:id", get(handlers::catalog::get_service))
        .route("/api/services/:id/add-ons", get(handlers::catalog::list_add_ons))
        .route("/api/schedule/dates", get(handlers::catalog::list_dates))
        .route("/api/schedule/slots", get(handlers::catalog::list_slots))
        // booking flow
        .route(
            "/api/booking/draft",
            get(handlers::booking::get_draft).delete(handlers::booking::reset_draft),
        )
        .route("/api/booking/draft/service", put(handlers::booking::select_service))
        .route("/api/booking/draft/add-ons", post(handlers::booking::add_add_on))
        .route(
            "/api/booking/draft/add-ons/:id",
            delete(handlers::booking::remove_add_on),
        )
        .route("/api/booking/draft/date", put(handlers::booking::select_date))
        .route("/api/booking/draft/slot", put(handlers::booking::select_slot))
        .route("/api/booking/draft/address", put(handlers::booking::select_address))
        .route("/api/booking/draft/payment", put(handlers::booking::select_payment))
        .route("/api/booking/steps/:step", get(handlers::booking::enter_step))
        .route("/api/booking/confirm", post(handlers::booking::confirm))
        // booking records
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route("/api/bookings/:id/cancel", post(handlers::bookings::cancel_booking))
        .route("/api/bookings/:id/review", post(handlers::bookings::review_booking))
        // saved addresses
        .route(
            "/api/addresses",
            get(handlers::addresses::list_addresses).post(handlers::addresses::create_address),
        )
        .route(
            "/api/addresses/:id",
            put(handlers::addresses::update_address).delete(handlers::addresses::delete_address),
        )
        .route(
            "/api/addresses/:id/default",
            post(handlers::addresses::set_default_address),
        )
        // partner
        .route("/api/partner/jobs", get(handlers::partner::list_jobs))
        .route("/api/partner/jobs/:id/start", post(handlers::partner::start_job))
        .route("/api/partner/jobs/:id/complete", post(handlers::partner::complete_job))
        // admin
        .route("/api/admin/bookings", get(handlers::admin::list_bookings))
        .route(
            "/api/admin/bookings/:id/assign",
            post(handlers::admin::assign_partner),
        )
        .route("/api/admin/stats", get(handlers::admin::stats))
        .route("/api/location/detect", post(handlers::location::detect))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
