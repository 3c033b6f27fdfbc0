//! Liveness and readiness probes

use std::collections::HashMap;
use std::time::Instant;

use actix_web::{web, HttpResponse};

use ag_core::repositories::{SessionRepository, UserRepository};
use ag_shared::types::{HealthResponse, HealthStatus, ServiceHealth};

use crate::app::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handler for GET /alive
pub async fn alive() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::from_services(HashMap::new(), VERSION))
}

/// Handler for GET /alive/ready
///
/// 200 while the session store answers, 503 otherwise.
pub async fn ready<U, S>(state: web::Data<AppState<U, S>>) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let started = Instant::now();
    let store = match state.auth_service.ping().await {
        Ok(()) => ServiceHealth {
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(error) => {
            log::warn!("Readiness check failed: {}", error);
            ServiceHealth {
                status: HealthStatus::Unhealthy,
                message: Some("store unavailable".to_string()),
                response_time_ms: None,
            }
        }
    };

    let mut services = HashMap::new();
    services.insert("store".to_string(), store);
    let health = HealthResponse::from_services(services, VERSION);

    if health.is_healthy() {
        HttpResponse::Ok().json(health)
    } else {
        HttpResponse::ServiceUnavailable().json(health)
    }
}
