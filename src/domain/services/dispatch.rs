use crate::domain::models::driver::{Driver, DriverStatus};

/// Picks the driver for a pending booking out of the candidate pool.
///
/// Eligibility: active, currently available, and never the customer's own
/// driver profile (a customer who is also a registered driver is excluded
/// from their own trips). Ties break on the lexicographically lowest driver
/// id, so repeated dispatch runs over the same pool pick the same driver.
pub fn select_driver<'a>(candidates: &'a [Driver], customer_user_id: &str) -> Option<&'a Driver> {
    candidates
        .iter()
        .filter(|d| d.is_active && d.status == DriverStatus::Available)
        .filter(|d| d.user_id.as_deref() != Some(customer_user_id))
        .min_by(|a, b| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: &str, user_id: Option<&str>, status: DriverStatus, is_active: bool) -> Driver {
        let mut d = Driver::new(
            user_id.map(str::to_string),
            "Test Driver".to_string(),
            "B-TX 0000".to_string(),
            "sedan".to_string(),
        );
        d.id = id.to_string();
        d.status = status;
        d.is_active = is_active;
        d
    }

    #[test]
    fn test_picks_lowest_id_among_available() {
        let pool = vec![
            driver("b", Some("u2"), DriverStatus::Available, true),
            driver("a", Some("u1"), DriverStatus::Busy, true),
            driver("c", Some("u3"), DriverStatus::Available, true),
        ];
        let picked = select_driver(&pool, "customer").unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn test_skips_inactive_and_self() {
        let pool = vec![
            driver("a", Some("u1"), DriverStatus::Available, false),
            driver("b", Some("customer"), DriverStatus::Available, true),
        ];
        assert!(select_driver(&pool, "customer").is_none());
    }

    #[test]
    fn test_empty_pool() {
        assert!(select_driver(&[], "customer").is_none());
    }
}
