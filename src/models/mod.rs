pub mod booking;
pub mod catalog;
pub mod draft;
pub mod user;

pub use booking::{Booking, BookingStatus, PaymentMethod, PaymentStatus, ReviewInput};
pub use catalog::{
    booking_dates, is_within_window, AddOn, Address, AddressForm, Service, ServiceCategory, TimeSlot,
};
pub use draft::{BookingDraft, DraftError};
pub use user::{ProfileUpdate, Role, User};
