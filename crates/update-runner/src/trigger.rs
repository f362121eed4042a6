// The manual-trigger HTTP endpoint. GET /update runs one update cycle
// synchronously and always answers the fixed acknowledgement string; cycle
// errors are logged, never surfaced to the caller.

use crate::supervisor::UpdateSupervisor;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// Acknowledgement returned for every trigger request.
pub const TRIGGER_ACK: &str = "Client Updated!";

/// Build the router exposing the manual update trigger.
pub fn router(supervisor: Arc<UpdateSupervisor>) -> Router {
    Router::new()
        .route("/update", get(trigger_update))
        .with_state(supervisor)
}

async fn trigger_update(State(supervisor): State<Arc<UpdateSupervisor>>) -> &'static str {
    match supervisor.check_for_updates().await {
        Ok(true) => tracing::info!("manually triggered update installed a new client"),
        Ok(false) => tracing::debug!("manually triggered update found nothing to do"),
        Err(e) => tracing::warn!(error = %e, "manually triggered update cycle failed"),
    }
    TRIGGER_ACK
}
