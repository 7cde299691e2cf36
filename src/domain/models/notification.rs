use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::booking::{Booking, BookingStatus};

/// Outbox row for the push collaborator. Enqueued in the same transaction as
/// the state change that caused it; the background worker drains PENDING rows
/// and hands delivery (and retries) to the collaborator.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: String,
    pub recipient_user_id: String,
    pub booking_id: String,
    pub title_en: String,
    pub title_de: String,
    pub body_en: String,
    pub body_de: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(recipient: &str, booking_id: &str, title_en: &str, title_de: &str, body_en: String, body_de: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient_user_id: recipient.to_string(),
            booking_id: booking_id.to_string(),
            title_en: title_en.to_string(),
            title_de: title_de.to_string(),
            body_en,
            body_de,
            status: "PENDING".to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn status_changed(booking: &Booking, status: BookingStatus) -> Self {
        let (title_en, title_de, body_en, body_de) = match status {
            BookingStatus::Confirmed => (
                "Booking confirmed",
                "Buchung bestätigt",
                format!("Your transfer to {} is confirmed.", booking.dropoff_location),
                format!("Ihr Transfer nach {} ist bestätigt.", booking.dropoff_location),
            ),
            BookingStatus::DriverEnRoute => (
                "Driver on the way",
                "Fahrer unterwegs",
                format!("Your driver is heading to {}.", booking.pickup_location),
                format!("Ihr Fahrer ist auf dem Weg nach {}.", booking.pickup_location),
            ),
            BookingStatus::InProgress => (
                "Trip started",
                "Fahrt gestartet",
                "Your trip is in progress.".to_string(),
                "Ihre Fahrt läuft.".to_string(),
            ),
            BookingStatus::Completed => (
                "Trip completed",
                "Fahrt abgeschlossen",
                "Thanks for riding with us. Please rate your driver.".to_string(),
                "Danke für Ihre Fahrt. Bitte bewerten Sie Ihren Fahrer.".to_string(),
            ),
            BookingStatus::Cancelled => (
                "Booking cancelled",
                "Buchung storniert",
                "Your booking has been cancelled.".to_string(),
                "Ihre Buchung wurde storniert.".to_string(),
            ),
            BookingStatus::Noshow => (
                "Trip not completed",
                "Fahrt nicht angetreten",
                "Your driver reported a no-show. Our team will follow up.".to_string(),
                "Ihr Fahrer meldete ein Nichterscheinen. Unser Team meldet sich.".to_string(),
            ),
            _ => (
                "Booking update",
                "Buchungsaktualisierung",
                format!("Your booking is now {}.", status),
                format!("Ihre Buchung ist jetzt {}.", status),
            ),
        };
        Notification::new(&booking.user_id, &booking.id, title_en, title_de, body_en, body_de)
    }

    /// Customer-facing assignment notice, carrying the driver snapshot.
    pub fn driver_assigned(booking: &Booking, driver_name: &str, driver_plate: &str) -> Self {
        Notification::new(
            &booking.user_id,
            &booking.id,
            "Driver assigned",
            "Fahrer zugeteilt",
            format!("{} (plate {}) will pick you up at {}.", driver_name, driver_plate, booking.pickup_location),
            format!("{} (Kennzeichen {}) holt Sie bei {} ab.", driver_name, driver_plate, booking.pickup_location),
        )
    }

    /// Driver-facing dispatch notice for the driver's linked user account.
    pub fn new_job(driver_user_id: &str, booking: &Booking) -> Self {
        Notification::new(
            driver_user_id,
            &booking.id,
            "New trip assigned",
            "Neue Fahrt zugeteilt",
            format!("Pickup at {}, dropoff {}.", booking.pickup_location, booking.dropoff_location),
            format!("Abholung bei {}, Ziel {}.", booking.pickup_location, booking.dropoff_location),
        )
    }
}
