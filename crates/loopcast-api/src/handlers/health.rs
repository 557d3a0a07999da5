//! Liveness check.

use axum::Json;
use loopcast_core::models::PingResponse;

#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses(
        (status = 200, description = "Service is reachable", body = PingResponse)
    )
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { ok: true })
}
