use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use duomatch_shared::types::event::{payloads, routing_keys, Event, ModerationActionType};

use crate::services::notification_service;
use crate::AppState;

/// Message template per moderation action. Dismiss and escalate are internal
/// outcomes with no user-facing message.
fn action_notification(
    action: ModerationActionType,
    reason: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Option<(String, String)> {
    match action {
        ModerationActionType::Warning => Some((
            "You received a warning".to_string(),
            format!("A moderator issued a warning: {reason}"),
        )),
        ModerationActionType::Mute => Some((
            "You have been muted".to_string(),
            format!("You have been temporarily muted: {reason}"),
        )),
        ModerationActionType::Suspend => {
            let until = match expires_at {
                Some(ts) => format!(" until {}", ts.format("%Y-%m-%d %H:%M UTC")),
                None => String::new(),
            };
            Some((
                "Account suspended".to_string(),
                format!("Your account has been suspended{until}: {reason}"),
            ))
        }
        ModerationActionType::Ban => Some((
            "Account banned".to_string(),
            format!("Your account has been permanently banned: {reason}"),
        )),
        ModerationActionType::Dismiss | ModerationActionType::Escalate => None,
    }
}

/// Listen for match resolution and reveal events.
pub async fn listen_match_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "duomatch-notification.match",
        &[
            routing_keys::MATCH_RESOLVED,
            routing_keys::REVEAL_GRANTED,
        ],
    ).await?;

    tracing::info!("listening for match events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::MATCH_RESOLVED {
                    match serde_json::from_slice::<Event<payloads::MatchResolved>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            tracing::info!(
                                match_id = %data.match_id,
                                status = %data.status,
                                "received match.resolved event"
                            );

                            // Only mutual acceptance is announced; a rejection
                            // is not broadcast to either side.
                            if data.status == "accepted" {
                                for player_id in [data.player_a_id, data.player_b_id] {
                                    if let Err(e) = notification_service::create_notification(
                                        &state.db,
                                        player_id,
                                        "match_accepted",
                                        "It's a match!",
                                        "You both accepted the match. Pick a game and start playing together.",
                                        Some(serde_json::json!({ "match_id": data.match_id })),
                                    ) {
                                        tracing::error!(error = %e, "failed to create match_accepted notification");
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize match.resolved event");
                        }
                    }
                } else if routing_key == routing_keys::REVEAL_GRANTED {
                    match serde_json::from_slice::<Event<payloads::RevealGranted>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            tracing::info!(
                                revealer_id = %data.revealer_id,
                                revealed_to_id = %data.revealed_to_id,
                                level = %data.level,
                                "received reveal.granted event"
                            );

                            let body = if data.is_mutual {
                                format!("Your match revealed their {} - you now share this level", data.level)
                            } else {
                                format!("Your match revealed their {} to you", data.level)
                            };

                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                data.revealed_to_id,
                                "reveal_granted",
                                "New profile reveal",
                                &body,
                                Some(serde_json::json!({
                                    "reveal_id": data.reveal_id,
                                    "revealer_id": data.revealer_id,
                                    "level": data.level,
                                    "is_mutual": data.is_mutual,
                                })),
                            ) {
                                tracing::error!(error = %e, "failed to create reveal notification");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize reveal.granted event");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "match consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for completed game sessions.
pub async fn listen_game_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "duomatch-notification.game",
        &[routing_keys::GAME_SESSION_COMPLETED],
    ).await?;

    tracing::info!("listening for game events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::SessionCompleted>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            session_id = %data.session_id,
                            duo_score = data.duo_score,
                            "received session.completed event"
                        );

                        for player_id in [data.player_a_id, data.player_b_id] {
                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                player_id,
                                "session_completed",
                                "Game complete",
                                &format!(
                                    "Your duo scored {} with a cooperation rating of {}",
                                    data.duo_score, data.cooperation_score
                                ),
                                Some(serde_json::json!({
                                    "session_id": data.session_id,
                                    "match_id": data.match_id,
                                    "duo_score": data.duo_score,
                                })),
                            ) {
                                tracing::error!(error = %e, "failed to create session_completed notification");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize session.completed event");
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "game consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for moderation outcomes (action.applied, appeal.decided).
pub async fn listen_moderation_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "duomatch-notification.moderation",
        &[
            routing_keys::MODERATION_ACTION_APPLIED,
            routing_keys::MODERATION_APPEAL_DECIDED,
        ],
    ).await?;

    tracing::info!("listening for moderation events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::MODERATION_ACTION_APPLIED {
                    match serde_json::from_slice::<Event<payloads::ActionApplied>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            tracing::info!(
                                target_user_id = %data.target_user_id,
                                action_type = %data.action_type,
                                "received action.applied event"
                            );

                            if let Some((title, body)) =
                                action_notification(data.action_type, &data.reason, data.expires_at)
                            {
                                if let Err(e) = notification_service::create_notification(
                                    &state.db,
                                    data.target_user_id,
                                    "moderation_action",
                                    &title,
                                    &body,
                                    Some(serde_json::json!({
                                        "action_id": data.action_id,
                                        "action_type": data.action_type,
                                        "expires_at": data.expires_at,
                                    })),
                                ) {
                                    tracing::error!(error = %e, "failed to create moderation notification");
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize action.applied event");
                        }
                    }
                } else if routing_key == routing_keys::MODERATION_APPEAL_DECIDED {
                    match serde_json::from_slice::<Event<payloads::AppealDecided>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            tracing::info!(
                                appeal_id = %data.appeal_id,
                                approved = data.approved,
                                "received appeal.decided event"
                            );

                            let (title, body) = if data.approved {
                                (
                                    "Appeal approved",
                                    "Your suspension has been lifted and your account is active again",
                                )
                            } else {
                                ("Appeal denied", "Your appeal was reviewed and denied")
                            };

                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                data.user_id,
                                "appeal_decided",
                                title,
                                body,
                                Some(serde_json::json!({
                                    "appeal_id": data.appeal_id,
                                    "approved": data.approved,
                                })),
                            ) {
                                tracing::error!(error = %e, "failed to create appeal_decided notification");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize appeal.decided event");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "moderation consumer error");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punitive_actions_have_a_message() {
        for action in [
            ModerationActionType::Warning,
            ModerationActionType::Mute,
            ModerationActionType::Suspend,
            ModerationActionType::Ban,
        ] {
            assert!(
                action_notification(action, "spamming", None).is_some(),
                "{action} should notify the target"
            );
        }
    }

    #[test]
    fn internal_outcomes_have_no_message() {
        assert!(action_notification(ModerationActionType::Dismiss, "n/a", None).is_none());
        assert!(action_notification(ModerationActionType::Escalate, "n/a", None).is_none());
    }

    #[test]
    fn suspension_message_includes_the_end_time_when_bounded() {
        let expires = "2026-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (_, body) =
            action_notification(ModerationActionType::Suspend, "harassment", Some(expires)).unwrap();
        assert!(body.contains("2026-03-01 12:00 UTC"), "{body}");

        let (_, open_ended) =
            action_notification(ModerationActionType::Suspend, "harassment", None).unwrap();
        assert!(!open_ended.contains("until"), "{open_ended}");
    }
}
