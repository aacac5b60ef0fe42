pub mod admin;
pub mod auth;
pub mod bookings;
pub mod cars;
pub mod dashboard;
pub mod documents;
pub mod open;
pub mod owner;
pub mod pay;
