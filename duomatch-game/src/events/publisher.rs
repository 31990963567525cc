use duomatch_shared::clients::rabbitmq::RabbitMQClient;
use duomatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::GameSession;

pub async fn publish_session_created(rabbitmq: &RabbitMQClient, session: &GameSession) {
    let event = Event::new(
        "duomatch-game",
        routing_keys::GAME_SESSION_CREATED,
        payloads::SessionCreated {
            session_id: session.id,
            match_id: session.match_id,
            game_id: session.game_id,
            player_a_id: session.player_a_id,
            player_b_id: session.player_b_id,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::GAME_SESSION_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish session.created event");
    }
}

pub async fn publish_session_completed(rabbitmq: &RabbitMQClient, session: &GameSession) {
    let event = Event::new(
        "duomatch-game",
        routing_keys::GAME_SESSION_COMPLETED,
        payloads::SessionCompleted {
            session_id: session.id,
            match_id: session.match_id,
            player_a_id: session.player_a_id,
            player_b_id: session.player_b_id,
            duo_score: session.duo_score.unwrap_or(0),
            cooperation_score: session.cooperation_score.unwrap_or(0),
            duration_minutes: session.duration_minutes.unwrap_or(0),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::GAME_SESSION_COMPLETED, &event).await {
        tracing::error!(error = %e, "failed to publish session.completed event");
    }
}
