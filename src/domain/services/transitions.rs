use crate::domain::models::auth::ActorRole;
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::error::AppError;

/// What the repository has to do to commit a validated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Plain guarded status step, no driver side effects.
    Advance,
    /// Release the driver and settle its trip aggregates.
    Complete,
    /// Terminal cancel; release the driver if one is held.
    Cancel,
    /// Terminal no-show; releases the driver and flags a dispute.
    Noshow,
}

#[derive(Debug, Clone, Copy)]
pub struct TransitionPlan {
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub action: TransitionAction,
}

/// Forward-only edge table. Dispatch may take a pending booking straight to
/// driver_assigned (cash-on-arrival trips are dispatched before payment
/// confirmation); everything else moves one step at a time.
fn allowed_next(from: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;
    match from {
        Pending => &[Confirmed, DriverAssigned, Cancelled],
        Confirmed => &[DriverAssigned, Cancelled],
        DriverAssigned => &[DriverEnRoute, Cancelled],
        DriverEnRoute => &[InProgress, Noshow],
        InProgress => &[Completed],
        Completed | Cancelled | Noshow => &[],
    }
}

pub fn is_legal_edge(from: BookingStatus, to: BookingStatus) -> bool {
    allowed_next(from).contains(&to)
}

fn invalid_transition(from: BookingStatus, to: BookingStatus) -> AppError {
    AppError::Conflict(format!("Invalid transition from {} to {}", from, to))
}

/// Validates a requested transition against the edge table and the actor
/// rules, without mutating anything. The returned plan is committed by the
/// repository under a compare-and-swap on `from`, so a concurrent writer that
/// got there first wins and this plan surfaces as a conflict.
///
/// `is_assigned_driver` must hold for driver actors acting on this booking;
/// ownership for customer actors is checked by the caller.
pub fn plan_transition(
    booking: &Booking,
    to: BookingStatus,
    role: ActorRole,
    is_assigned_driver: bool,
    note: Option<&str>,
) -> Result<TransitionPlan, AppError> {
    let from = booking.status;

    if !is_legal_edge(from, to) {
        return Err(invalid_transition(from, to));
    }

    match to {
        BookingStatus::DriverAssigned => {
            // Assignment needs a driver pick and the paired driver write;
            // it only happens through dispatch.
            return Err(AppError::Validation(
                "Driver assignment goes through dispatch, not a status update".into(),
            ));
        }
        BookingStatus::Confirmed => {
            // Normally flipped by payment confirmation; admins may force it.
            if role != ActorRole::Admin {
                return Err(AppError::Forbidden("Only payment confirmation can confirm a booking".into()));
            }
        }
        BookingStatus::Cancelled => match role {
            ActorRole::Customer => {
                if !matches!(from, BookingStatus::Pending | BookingStatus::Confirmed) {
                    return Err(AppError::Forbidden(
                        "Customers can only cancel before a driver is assigned".into(),
                    ));
                }
            }
            ActorRole::Admin => {}
            ActorRole::Driver => {
                return Err(AppError::Forbidden("Drivers cannot cancel bookings".into()));
            }
        },
        BookingStatus::Noshow => {
            if role != ActorRole::Driver || !is_assigned_driver {
                return Err(AppError::Forbidden("Only the assigned driver can report a no-show".into()));
            }
        }
        BookingStatus::DriverEnRoute | BookingStatus::InProgress | BookingStatus::Completed => {
            match role {
                ActorRole::Driver if is_assigned_driver => {}
                ActorRole::Admin => {}
                _ => {
                    return Err(AppError::Forbidden(
                        "Only the assigned driver or an admin can advance this booking".into(),
                    ));
                }
            }
        }
        BookingStatus::Pending => return Err(invalid_transition(from, to)),
    }

    // Forced admin edges must leave an audit trail.
    if role == ActorRole::Admin && note.map(str::trim).unwrap_or_default().is_empty() {
        return Err(AppError::Validation("Admin status changes require a note".into()));
    }

    let action = match to {
        BookingStatus::Completed => TransitionAction::Complete,
        BookingStatus::Cancelled => TransitionAction::Cancel,
        BookingStatus::Noshow => TransitionAction::Noshow,
        _ => TransitionAction::Advance,
    };

    Ok(TransitionPlan { from, to, action })
}
