use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    Busy,
    Offline,
    Suspended,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Available => "available",
            DriverStatus::Busy => "busy",
            DriverStatus::Offline => "offline",
            DriverStatus::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(DriverStatus::Available),
            "busy" => Some(DriverStatus::Busy),
            "offline" => Some(DriverStatus::Offline),
            "suspended" => Some(DriverStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DriverStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DriverStatus::parse(&value).ok_or_else(|| format!("unknown driver status '{}'", value))
    }
}

/// A service provider entity, distinct from its linked user identity.
/// `busy` is owned by the dispatch/transition transactions: a driver is busy
/// iff exactly one booking in an active status references it.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Driver {
    pub id: String,
    /// Linked identity-provider user, if the driver also has an account.
    /// Cleared when an admin hard-deletes the driver.
    pub user_id: Option<String>,
    pub name: String,
    pub vehicle_plate: String,
    pub vehicle_type: String,
    #[sqlx(try_from = "String")]
    pub status: DriverStatus,
    pub is_active: bool,
    pub total_trips: i64,
    pub total_earnings: i64,
    pub pending_earnings: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(user_id: Option<String>, name: String, vehicle_plate: String, vehicle_type: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            vehicle_plate,
            vehicle_type,
            status: DriverStatus::Offline,
            is_active: true,
            total_trips: 0,
            total_earnings: 0,
            pending_earnings: 0,
            rating: 0.0,
            rating_count: 0,
            last_lat: None,
            last_lng: None,
            location_updated_at: None,
            created_at: Utc::now(),
        }
    }
}
