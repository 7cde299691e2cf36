use crate::domain::models::{
    booking::{Booking, BookingStatus, NewHistoryEntry, StatusHistoryEntry},
    driver::Driver,
    notification::Notification,
    rating::{Rating, RatingType},
};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// History rows get their timestamp here, inside the transaction, so the
/// recorded order matches the commit order.
async fn insert_history(
    tx: &mut Transaction<'_, Sqlite>,
    booking_id: &str,
    entry: &NewHistoryEntry,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO booking_status_history (booking_id, status, note, updated_by, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(booking_id)
        .bind(entry.status.as_str())
        .bind(&entry.note)
        .bind(&entry.updated_by)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

async fn insert_notifications(
    tx: &mut Transaction<'_, Sqlite>,
    notifications: &[Notification],
) -> Result<(), AppError> {
    for n in notifications {
        sqlx::query(
            "INSERT INTO notifications (id, recipient_user_id, booking_id, title_en, title_de, body_en, body_de, status, error_message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&n.id).bind(&n.recipient_user_id).bind(&n.booking_id)
            .bind(&n.title_en).bind(&n.title_de).bind(&n.body_en).bind(&n.body_de)
            .bind(&n.status).bind(&n.error_message).bind(n.created_at)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
    }
    Ok(())
}

fn stale_state() -> AppError {
    AppError::Conflict("Booking state changed, please refresh".to_string())
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking, notifications: Vec<Notification>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, customer_email, customer_phone, pickup_location, dropoff_location, scheduled_time, trip_type, vehicle_type, status, payment_status, driver_id, driver_name, driver_plate, total_cost, customer_rated, driver_rated, disputed, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.customer_email).bind(&booking.customer_phone)
            .bind(&booking.pickup_location).bind(&booking.dropoff_location).bind(booking.scheduled_time)
            .bind(&booking.trip_type).bind(&booking.vehicle_type)
            .bind(booking.status.as_str()).bind(booking.payment_status.as_str())
            .bind(&booking.driver_id).bind(&booking.driver_name).bind(&booking.driver_plate)
            .bind(booking.total_cost).bind(booking.customer_rated).bind(booking.driver_rated)
            .bind(booking.disputed).bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let entry = NewHistoryEntry::new(booking.status, &booking.user_id, Some("Booking created".into()));
        insert_history(&mut tx, &booking.id, &entry).await?;
        insert_notifications(&mut tx, &notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn history(&self, booking_id: &str) -> Result<Vec<StatusHistoryEntry>, AppError> {
        sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM booking_status_history WHERE booking_id = ? ORDER BY seq ASC"
        )
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_active_for_driver(&self, driver_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM bookings WHERE driver_id = ? AND status IN ('driver_assigned', 'driver_en_route', 'in_progress')"
        )
            .bind(driver_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn advance(
        &self,
        id: &str,
        from: BookingStatus,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ? WHERE id = ? AND status = ? RETURNING *"
        )
            .bind(entry.status.as_str())
            .bind(id)
            .bind(from.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(stale_state)?;

        insert_history(&mut tx, id, &entry).await?;
        insert_notifications(&mut tx, &notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn confirm_payment(
        &self,
        id: &str,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'confirmed', payment_status = 'paid'
             WHERE id = ? AND status = 'pending' AND payment_status = 'unpaid'
             RETURNING *"
        )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(stale_state)?;

        insert_history(&mut tx, id, &entry).await?;
        insert_notifications(&mut tx, &notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn assign_driver(
        &self,
        id: &str,
        driver: &Driver,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'driver_assigned', driver_id = ?, driver_name = ?, driver_plate = ?
             WHERE id = ? AND status IN ('pending', 'confirmed') AND driver_id IS NULL
             RETURNING *"
        )
            .bind(&driver.id)
            .bind(&driver.name)
            .bind(&driver.vehicle_plate)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking already assigned or no longer pending".to_string()))?;

        // The booking must never read driver_assigned while the driver still
        // reads available; failing this guard rolls the booking update back.
        let result = sqlx::query(
            "UPDATE drivers SET status = 'busy' WHERE id = ? AND status = 'available' AND is_active = 1"
        )
            .bind(&driver.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Driver is no longer available".to_string()));
        }

        insert_history(&mut tx, id, &entry).await?;
        insert_notifications(&mut tx, &notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn complete(
        &self,
        id: &str,
        driver_id: &str,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'completed' WHERE id = ? AND status = 'in_progress' RETURNING *"
        )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(stale_state)?;

        let result = sqlx::query(
            "UPDATE drivers SET status = 'available', total_trips = total_trips + 1, total_earnings = total_earnings + ?
             WHERE id = ? AND status = 'busy'"
        )
            .bind(updated.total_cost)
            .bind(driver_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::InternalWithMsg(format!(
                "Driver {} not busy while completing booking {}",
                driver_id, id
            )));
        }

        insert_history(&mut tx, id, &entry).await?;
        insert_notifications(&mut tx, &notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn terminate(
        &self,
        id: &str,
        from: &[BookingStatus],
        to: BookingStatus,
        release_driver: Option<&str>,
        flag_dispute: bool,
        entry: NewHistoryEntry,
        notifications: Vec<Notification>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let placeholders = vec!["?"; from.len()].join(", ");
        let sql = format!(
            "UPDATE bookings SET status = ?, driver_id = NULL, driver_name = NULL, driver_plate = NULL,
                    disputed = (disputed OR ?)
             WHERE id = ? AND status IN ({})
             RETURNING *",
            placeholders
        );
        let mut query = sqlx::query_as::<_, Booking>(&sql)
            .bind(to.as_str())
            .bind(flag_dispute)
            .bind(id);
        for status in from {
            query = query.bind(status.as_str());
        }
        let updated = query
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(stale_state)?;

        if let Some(driver_id) = release_driver {
            sqlx::query("UPDATE drivers SET status = 'available' WHERE id = ? AND status = 'busy'")
                .bind(driver_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        insert_history(&mut tx, id, &entry).await?;
        insert_notifications(&mut tx, &notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn flag_disputed(&self, id: &str, entry: NewHistoryEntry) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET disputed = 1 WHERE id = ? RETURNING *"
        )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".to_string()))?;

        insert_history(&mut tx, id, &entry).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn submit_rating(&self, rating: &Rating, driver_id: Option<&str>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Read-and-set of the rated flag is one guarded statement: the loser
        // of a double submission sees zero rows and nothing else happens.
        let flag_sql = match rating.rating_type {
            RatingType::CustomerToDriver => {
                "UPDATE bookings SET customer_rated = 1 WHERE id = ? AND customer_rated = 0"
            }
            RatingType::DriverToCustomer => {
                "UPDATE bookings SET driver_rated = 1 WHERE id = ? AND driver_rated = 0"
            }
        };
        let result = sqlx::query(flag_sql)
            .bind(&rating.booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("This booking side has already been rated".to_string()));
        }

        sqlx::query(
            "INSERT INTO ratings (id, booking_id, rating_type, rater_user_id, stars, reasons, comment, tip, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&rating.id).bind(&rating.booking_id).bind(rating.rating_type.as_str())
            .bind(&rating.rater_user_id).bind(rating.stars).bind(&rating.reasons)
            .bind(&rating.comment).bind(rating.tip).bind(rating.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(driver_id) = driver_id {
            sqlx::query(
                "UPDATE drivers SET rating = (rating * rating_count + ?) / (rating_count + 1),
                        rating_count = rating_count + 1,
                        pending_earnings = pending_earnings + ?
                 WHERE id = ?"
            )
                .bind(rating.stars)
                .bind(rating.tip)
                .bind(driver_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn purge(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM booking_status_history WHERE booking_id = ?")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM ratings WHERE booking_id = ?")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM notifications WHERE booking_id = ?")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
