use crate::domain::models::driver::{Driver, DriverStatus};
use crate::domain::ports::DriverRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresDriverRepo {
    pool: PgPool,
}

impl PostgresDriverRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PostgresDriverRepo {
    async fn create(&self, driver: &Driver) -> Result<Driver, AppError> {
        sqlx::query_as::<_, Driver>(
            "INSERT INTO drivers (id, user_id, name, vehicle_plate, vehicle_type, status, is_active, total_trips, total_earnings, pending_earnings, rating, rating_count, last_lat, last_lng, location_updated_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING *"
        )
            .bind(&driver.id).bind(&driver.user_id).bind(&driver.name)
            .bind(&driver.vehicle_plate).bind(&driver.vehicle_type)
            .bind(driver.status.as_str()).bind(driver.is_active)
            .bind(driver.total_trips).bind(driver.total_earnings).bind(driver.pending_earnings)
            .bind(driver.rating).bind(driver.rating_count)
            .bind(driver.last_lat).bind(driver.last_lng).bind(driver.location_updated_at)
            .bind(driver.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Driver>, AppError> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Driver>, AppError> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, status: Option<DriverStatus>) -> Result<Vec<Driver>, AppError> {
        match status {
            Some(status) => sqlx::query_as::<_, Driver>(
                "SELECT * FROM drivers WHERE status = $1 AND is_active ORDER BY id ASC"
            )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE is_active ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }

    async fn list_available(&self) -> Result<Vec<Driver>, AppError> {
        sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE status = 'available' AND is_active ORDER BY id ASC"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, from: &[DriverStatus], to: DriverStatus) -> Result<Driver, AppError> {
        let from_states: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let updated = sqlx::query_as::<_, Driver>(
            "UPDATE drivers SET status = $1 WHERE id = $2 AND is_active AND status = ANY($3) RETURNING *"
        )
            .bind(to.as_str())
            .bind(id)
            .bind(from_states)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        match updated {
            Some(driver) => Ok(driver),
            None => {
                if self.find_by_id(id).await?.is_some() {
                    Err(AppError::Conflict("Driver is not in a state that allows this change".to_string()))
                } else {
                    Err(AppError::NotFound("Driver not found".to_string()))
                }
            }
        }
    }

    async fn update_location(&self, id: &str, lat: f64, lng: f64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE drivers SET last_lat = $1, last_lng = $2, location_updated_at = $3 WHERE id = $4 AND is_active"
        )
            .bind(lat)
            .bind(lng)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Driver not found".to_string()));
        }
        Ok(())
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE drivers SET is_active = FALSE, status = 'offline' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Driver not found".to_string()));
        }
        Ok(())
    }

    async fn delete_detaching_user(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("UPDATE drivers SET user_id = NULL WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Driver not found".to_string()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
