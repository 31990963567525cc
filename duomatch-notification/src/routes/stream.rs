use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::Utc;
use diesel::prelude::*;
use futures::stream::Stream;

use duomatch_shared::types::auth::AuthUser;

use crate::models::Notification;
use crate::schema::notifications;
use crate::AppState;

/// `GET /notifications/stream` - server-push stream of new notifications.
///
/// Push is emulated by re-querying for rows created after the last emitted
/// cursor on a fixed interval. Heartbeat comments keep the connection alive
/// through proxies; dropping the connection tears the loop down.
pub async fn notification_stream(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let poll_secs = state.config.stream_poll_secs.max(1);

    tracing::info!(user_id = %auth.id, "notification stream connected");

    let stream = async_stream::stream! {
        let mut cursor = Utc::now();
        let mut interval = tokio::time::interval(Duration::from_secs(poll_secs));

        loop {
            interval.tick().await;

            let fresh: Vec<Notification> = match state.db.get() {
                Ok(mut conn) => notifications::table
                    .filter(notifications::user_id.eq(auth.id))
                    .filter(notifications::created_at.gt(cursor))
                    .order(notifications::created_at.asc())
                    .load::<Notification>(&mut conn)
                    .unwrap_or_else(|e| {
                        tracing::error!(error = %e, "stream poll query failed");
                        vec![]
                    }),
                Err(e) => {
                    tracing::error!(error = %e, "stream poll could not get db connection");
                    vec![]
                }
            };

            for notification in fresh {
                if notification.created_at > cursor {
                    cursor = notification.created_at;
                }

                let json = match serde_json::to_string(&notification) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to serialize notification");
                        continue;
                    }
                };

                yield Ok(SseEvent::default()
                    .event("notification")
                    .id(notification.id.to_string())
                    .data(json));
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
