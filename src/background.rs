use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;

/// Drains the notification outbox. Rows are claimed (PENDING -> PROCESSING)
/// before delivery, so each row is attempted at most once.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting notification worker...");

    loop {
        match state.notification_repo.find_pending(10).await {
            Ok(notifications) => {
                for notification in notifications {
                    let span = info_span!(
                        "notification",
                        notification_id = %notification.id,
                        recipient = %notification.recipient_user_id,
                    );

                    let state = state.clone();

                    async move {
                        match state.push_service.send(&notification).await {
                            Ok(_) => {
                                info!("Notification delivered");
                                if let Err(e) = state.notification_repo.update_status(&notification.id, "SENT", None).await {
                                    error!("Failed to mark notification as sent: {:?}", e);
                                }
                            }
                            Err(e) => {
                                let err_msg = format!("{}", e);
                                error!("Notification delivery failed: {}", err_msg);
                                if let Err(up_err) = state.notification_repo.update_status(&notification.id, "FAILED", Some(err_msg)).await {
                                    error!("Failed to mark notification as failed: {:?}", up_err);
                                }
                            }
                        }
                    }
                        .instrument(span)
                        .await;
                }
            }
            Err(e) => error!("Failed to fetch pending notifications: {:?}", e),
        }
        sleep(Duration::from_secs(5)).await;
    }
}
