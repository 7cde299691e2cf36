pub mod booking;
pub mod dispatch;
pub mod driver;
pub mod health;
pub mod rating;
