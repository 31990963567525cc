use axum::Json;
use duomatch_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("duomatch-match", env!("CARGO_PKG_VERSION")))
}
