pub mod addresses;
pub mod admin;
pub mod auth;
pub mod booking;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod location;
pub mod navigation;
pub mod partner;
