//! Row types for the booking store

pub mod booking;
pub mod dining_table;

pub use booking::{Booking, BookingCreate};
pub use dining_table::DiningTable;
