use chrono::{DateTime, Utc};
use uuid::Uuid;

use duomatch_shared::clients::rabbitmq::RabbitMQClient;
use duomatch_shared::types::event::{payloads, routing_keys, Event, ModerationActionType};

use crate::models::{Appeal, ModerationAction};

pub async fn publish_report_created(
    rabbitmq: &RabbitMQClient,
    report_id: Uuid,
    reporter_id: Uuid,
    reported_id: Uuid,
    report_type: &str,
) {
    let event = Event::new(
        "duomatch-moderation",
        routing_keys::MODERATION_REPORT_CREATED,
        payloads::ReportCreated {
            report_id,
            reporter_id,
            reported_id,
            report_type: report_type.to_string(),
        },
    )
    .with_user(reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_REPORT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish report.created event");
    }
}

pub async fn publish_action_applied(
    rabbitmq: &RabbitMQClient,
    action: &ModerationAction,
    action_type: ModerationActionType,
    expires_at: Option<DateTime<Utc>>,
) {
    let event = Event::new(
        "duomatch-moderation",
        routing_keys::MODERATION_ACTION_APPLIED,
        payloads::ActionApplied {
            action_id: action.id,
            report_id: action.report_id,
            target_user_id: action.target_user_id,
            action_type,
            reason: action.reason.clone(),
            duration_hours: action.duration_hours,
            expires_at,
        },
    )
    .with_user(action.target_user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_ACTION_APPLIED, &event).await {
        tracing::error!(error = %e, "failed to publish action.applied event");
    }
}

pub async fn publish_appeal_decided(rabbitmq: &RabbitMQClient, appeal: &Appeal, approved: bool) {
    let event = Event::new(
        "duomatch-moderation",
        routing_keys::MODERATION_APPEAL_DECIDED,
        payloads::AppealDecided {
            appeal_id: appeal.id,
            user_id: appeal.user_id,
            suspension_id: appeal.suspension_id,
            approved,
        },
    )
    .with_user(appeal.user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_APPEAL_DECIDED, &event).await {
        tracing::error!(error = %e, "failed to publish appeal.decided event");
    }
}
