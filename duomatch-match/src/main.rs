use axum::routing::{get, post};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod decision;
mod events;
mod ladder;
mod models;
mod routes;
mod schema;

use config::AppConfig;
use duomatch_shared::clients::rabbitmq::RabbitMQClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    duomatch_shared::middleware::init_tracing("duomatch-match");

    let config = AppConfig::load()?;
    let port = config.port;

    // The auth extractor reads the secret from the environment
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/matches", get(routes::matches::list_matches))
        .route("/matches/:id", get(routes::matches::get_match))
        .route("/matches/:id/decision", post(routes::matches::submit_decision))
        .route("/reveals", post(routes::reveals::request_reveal))
        .route("/reveals/:user_id", get(routes::reveals::get_reveal_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "duomatch-match starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
