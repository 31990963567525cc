use axum::routing::{get, post, put};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod lifecycle;
mod models;
mod routes;
mod schema;
mod scoring;

use config::AppConfig;
use duomatch_shared::clients::rabbitmq::RabbitMQClient;
use duomatch_shared::clients::redis::RedisClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    duomatch_shared::middleware::init_tracing("duomatch-game");

    let config = AppConfig::load()?;
    let port = config.port;

    // The auth extractor reads the secret from the environment
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    let metrics_handle = duomatch_shared::middleware::init_metrics();

    let state = Arc::new(AppState { db, config, rabbitmq, redis, metrics_handle });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/games", get(routes::sessions::list_games))
        .route("/sessions", post(routes::sessions::create_session))
        .route("/sessions/:id", get(routes::sessions::get_session))
        .route("/sessions/:id/state", put(routes::sessions::advance_state))
        .route("/sessions/:id/end", post(routes::sessions::end_session))
        .route("/matches/:id/aggregate", get(routes::stats::get_match_aggregate))
        .route("/stats/:user_id", get(routes::stats::get_user_stats))
        .route("/leaderboard", get(routes::stats::get_leaderboard))
        .route("/points", get(routes::stats::list_point_transactions))
        .layer(axum::middleware::from_fn(duomatch_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "duomatch-game starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
