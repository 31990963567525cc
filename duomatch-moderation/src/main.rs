use axum::routing::{get, post, put};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod actions;
mod config;
mod events;
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
    duomatch_shared::middleware::init_tracing("duomatch-moderation");

    let config = AppConfig::load()?;
    let port = config.port;

    // The auth extractor reads the secret from the environment
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let admin_routes = Router::new()
        .route("/reports", get(routes::admin_routes::list_reports))
        .route("/reports/:id", get(routes::admin_routes::get_report))
        .route("/reports/:id/action", put(routes::admin_routes::apply_action))
        .route("/appeals", get(routes::admin_routes::list_appeals))
        .route("/appeals/:id/review", put(routes::admin_routes::review_appeal))
        .route("/stats", get(routes::admin_routes::get_stats));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/report", post(routes::user_routes::create_report))
        .route("/appeals", post(routes::user_routes::create_appeal))
        .route("/suspensions", get(routes::user_routes::my_suspensions))
        .nest("/admin", admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "duomatch-moderation starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
