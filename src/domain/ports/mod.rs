use crate::domain::models::{
    booking::{Booking, BookingStatus, NewHistoryEntry, StatusHistoryEntry},
    driver::{Driver, DriverStatus},
    notification::Notification,
    rating::Rating,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Booking store. Every mutating method that changes `status` takes the
/// expected current state and commits the status change, its history row and
/// any notification intents in one transaction; a stale expectation loses the
/// compare-and-swap and surfaces as a conflict instead of clobbering a newer
/// write. Methods touching a driver row perform the paired update inside the
/// same transaction.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking, notifications: Vec<Notification>) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_all(&self) -> Result<Vec<Booking>, AppError>;
    async fn history(&self, booking_id: &str) -> Result<Vec<StatusHistoryEntry>, AppError>;
    async fn count_active_for_driver(&self, driver_id: &str) -> Result<i64, AppError>;

    /// Plain forward step with no driver side effects
    /// (driver_assigned -> driver_en_route -> in_progress).
    async fn advance(
        &self,
        id: &str,
        from: BookingStatus,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError>;

    /// pending/unpaid -> confirmed/paid in a single guarded statement.
    async fn confirm_payment(
        &self,
        id: &str,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError>;

    /// Paired dispatch write: the booking takes the driver snapshot and
    /// becomes driver_assigned, the driver flips available -> busy. Either
    /// guard failing rolls the whole transaction back.
    async fn assign_driver(
        &self,
        id: &str,
        driver: &Driver,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError>;

    /// in_progress -> completed; releases the driver and settles its trip
    /// aggregates (total_trips, total_earnings) in the same transaction.
    async fn complete(
        &self,
        id: &str,
        driver_id: &str,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError>;

    /// Terminal cancel/noshow. Clears the driver snapshot, releases
    /// `release_driver` back to available when a driver was held, and sets
    /// the dispute flag for noshow.
    async fn terminate(
        &self,
        id: &str,
        from: &[BookingStatus],
        to: BookingStatus,
        release_driver: Option<&str>,
        flag_dispute: bool,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError>;

    /// Admin side channel: sets the dispute flag and records a history note
    /// without touching the customer-visible status.
    async fn flag_disputed(&self, id: &str, entry: NewHistoryEntry) -> Result<Booking, AppError>;

    /// Rated-flag compare-and-swap, rating insert and (for customer ratings)
    /// driver aggregate/tip update in one transaction. A second submission
    /// for the same (booking, side) loses the flag swap.
    async fn submit_rating(&self, rating: &Rating, driver_id: Option<&str>) -> Result<(), AppError>;

    /// Explicit maintenance purge; the only physical delete.
    async fn purge(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn create(&self, driver: &Driver) -> Result<Driver, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Driver>, AppError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Driver>, AppError>;
    async fn list(&self, status: Option<DriverStatus>) -> Result<Vec<Driver>, AppError>;
    /// Eligible dispatch pool: active and available, ordered by id so the
    /// tie-break stays deterministic.
    async fn list_available(&self) -> Result<Vec<Driver>, AppError>;
    /// Guarded status flip; fails with a conflict if the driver left the
    /// expected state (e.g. got dispatched meanwhile).
    async fn set_status(&self, id: &str, from: &[DriverStatus], to: DriverStatus) -> Result<Driver, AppError>;
    async fn update_location(&self, id: &str, lat: f64, lng: f64) -> Result<(), AppError>;
    /// Soft delete.
    async fn deactivate(&self, id: &str) -> Result<(), AppError>;
    /// Hard delete; detaches the linked user in the same transaction.
    async fn delete_detaching_user(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Claims up to `limit` PENDING intents (marking them PROCESSING) so
    /// concurrent workers never double-send.
    async fn find_pending(&self, limit: i32) -> Result<Vec<Notification>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}

/// Push collaborator boundary. Delivery and retry are its responsibility;
/// the core only hands over the intent.
#[async_trait]
pub trait PushService: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), AppError>;
}
