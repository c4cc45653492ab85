pub mod auth;
pub mod checkout;
pub mod flow;
pub mod gateway;
pub mod identity;
pub mod inflight;
pub mod location;
pub mod otp;
pub mod pricing;
pub mod route_guard;
pub mod session;
