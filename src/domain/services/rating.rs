use crate::domain::models::rating::RatingType;
use crate::error::AppError;

/// Reason codes accepted alongside low ratings.
pub const LOW_STAR_REASONS: &[&str] = &["late", "driving", "vehicle_condition", "rude", "navigation", "other"];

pub const MAX_COMMENT_LEN: usize = 500;
pub const MAX_TIP_CENTS: i64 = 10_000;

#[derive(Debug, Clone)]
pub struct ValidatedRating {
    pub stars: i64,
    pub reasons: Vec<String>,
    pub comment: Option<String>,
    pub tip: i64,
}

/// Validates and normalizes a rating submission. Reasons are mandatory and
/// whitelisted when stars <= 3; comments are stripped of control and markup
/// characters and length-capped; tips only apply customer-to-driver and are
/// capped.
pub fn validate_rating(
    rating_type: RatingType,
    stars: i64,
    reasons: Option<Vec<String>>,
    comment: Option<String>,
    tip: Option<i64>,
) -> Result<ValidatedRating, AppError> {
    if !(1..=5).contains(&stars) {
        return Err(AppError::Validation("Stars must be between 1 and 5".into()));
    }

    let reasons = reasons.unwrap_or_default();
    if stars <= 3 {
        if reasons.is_empty() {
            return Err(AppError::Validation("Reasons are required for ratings of 3 stars or less".into()));
        }
        for reason in &reasons {
            if !LOW_STAR_REASONS.contains(&reason.as_str()) {
                return Err(AppError::Validation(format!("Unknown reason code '{}'", reason)));
            }
        }
    }

    let comment = comment
        .map(|c| sanitize_comment(&c))
        .filter(|c| !c.is_empty());

    let tip = match tip {
        None => 0,
        Some(_) if rating_type == RatingType::DriverToCustomer => {
            return Err(AppError::Validation("Tips only apply to driver ratings".into()));
        }
        Some(t) if t < 0 => return Err(AppError::Validation("Tip cannot be negative".into())),
        Some(t) if t > MAX_TIP_CENTS => {
            return Err(AppError::Validation(format!("Tip exceeds the maximum of {} cents", MAX_TIP_CENTS)));
        }
        Some(t) => t,
    };

    Ok(ValidatedRating { stars, reasons, comment, tip })
}

/// Strips control and markup characters and caps the length.
fn sanitize_comment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | '&' | '"' | '\'' | '`'))
        .collect();
    let trimmed = cleaned.trim();
    trimmed.chars().take(MAX_COMMENT_LEN).collect()
}
