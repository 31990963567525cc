use axum::Json;
use duomatch_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("duomatch-notification", env!("CARGO_PKG_VERSION")))
}
