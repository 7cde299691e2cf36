pub mod postgres_booking_repo;
pub mod postgres_driver_repo;
pub mod postgres_notification_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_driver_repo;
pub mod sqlite_notification_repo;
