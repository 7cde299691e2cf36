use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingType {
    CustomerToDriver,
    DriverToCustomer,
}

impl RatingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingType::CustomerToDriver => "customer_to_driver",
            RatingType::DriverToCustomer => "driver_to_customer",
        }
    }
}

impl fmt::Display for RatingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RatingType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "customer_to_driver" => Ok(RatingType::CustomerToDriver),
            "driver_to_customer" => Ok(RatingType::DriverToCustomer),
            _ => Err(format!("unknown rating type '{}'", value)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Rating {
    pub id: String,
    pub booking_id: String,
    #[sqlx(try_from = "String")]
    pub rating_type: RatingType,
    pub rater_user_id: String,
    pub stars: i64,
    pub reasons: Json<Vec<String>>,
    pub comment: Option<String>,
    pub tip: i64,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        booking_id: String,
        rating_type: RatingType,
        rater_user_id: String,
        stars: i64,
        reasons: Vec<String>,
        comment: Option<String>,
        tip: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            rating_type,
            rater_user_id,
            stars,
            reasons: Json(reasons),
            comment,
            tip,
            created_at: Utc::now(),
        }
    }
}
