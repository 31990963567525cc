use uuid::Uuid;

use duomatch_shared::clients::rabbitmq::RabbitMQClient;
use duomatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Match, ProfileReveal};

pub async fn publish_decision_submitted(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_id: Uuid,
    decision: &str,
) {
    let event = Event::new(
        "duomatch-match",
        routing_keys::MATCH_DECISION_SUBMITTED,
        payloads::DecisionSubmitted {
            match_id,
            user_id,
            decision: decision.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCH_DECISION_SUBMITTED, &event).await {
        tracing::error!(error = %e, "failed to publish decision.submitted event");
    }
}

pub async fn publish_match_resolved(rabbitmq: &RabbitMQClient, m: &Match) {
    let event = Event::new(
        "duomatch-match",
        routing_keys::MATCH_RESOLVED,
        payloads::MatchResolved {
            match_id: m.id,
            player_a_id: m.player_a_id,
            player_b_id: m.player_b_id,
            status: m.status.clone(),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MATCH_RESOLVED, &event).await {
        tracing::error!(error = %e, "failed to publish match.resolved event");
    }
}

pub async fn publish_reveal_granted(rabbitmq: &RabbitMQClient, reveal: &ProfileReveal) {
    let event = Event::new(
        "duomatch-match",
        routing_keys::REVEAL_GRANTED,
        payloads::RevealGranted {
            reveal_id: reveal.id,
            revealer_id: reveal.revealer_id,
            revealed_to_id: reveal.revealed_to_id,
            level: reveal.reveal_level.clone(),
            is_mutual: reveal.is_mutual,
        },
    )
    .with_user(reveal.revealer_id);

    if let Err(e) = rabbitmq.publish(routing_keys::REVEAL_GRANTED, &event).await {
        tracing::error!(error = %e, "failed to publish reveal.granted event");
    }
}
