pub mod auth;
pub mod booking;
pub mod driver;
pub mod notification;
pub mod rating;
