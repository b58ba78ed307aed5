//! Liveness and readiness probes.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Probe flags flipped by the server lifecycle.
///
/// Starts live but not ready; the server marks it ready once the listener
/// is bound and unhealthy when draining.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.ready.store(false, Ordering::Release);
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Probe response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeStatus {
    #[schema(example = "ok")]
    pub status: &'static str,
}

fn probe_response(ok: bool) -> HttpResponse {
    let (mut builder, status) = if ok {
        (HttpResponse::Ok(), "ok")
    } else {
        (HttpResponse::ServiceUnavailable(), "unavailable")
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ProbeStatus { status })
}

/// Readiness probe: 200 once the server accepts traffic.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready", body = ProbeStatus),
        (status = 503, description = "Not ready", body = ProbeStatus)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready())
}

/// Liveness probe: 200 until the process starts draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Alive", body = ProbeStatus),
        (status = 503, description = "Draining", body = ProbeStatus)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    async fn probe(state: web::Data<HealthState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = actix_test::init_service(App::new().app_data(state).service(ready).service(live)).await;
        let response = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        (status, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE, "unavailable")]
    #[case(true, StatusCode::OK, "ok")]
    #[actix_web::test]
    async fn readiness_follows_state(
        #[case] mark_ready: bool,
        #[case] expected: StatusCode,
        #[case] body: &str,
    ) {
        let state = web::Data::new(HealthState::new());
        if mark_ready {
            state.mark_ready();
        }
        let (status, json) = probe(state, "/health/ready").await;
        assert_eq!(status, expected);
        assert_eq!(json["status"], body);
    }

    #[actix_web::test]
    async fn draining_fails_both_probes() {
        let state = web::Data::new(HealthState::new());
        state.mark_ready();
        state.mark_unhealthy();

        let (live_status, _) = probe(state.clone(), "/health/live").await;
        let (ready_status, _) = probe(state, "/health/ready").await;
        assert_eq!(live_status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ready_status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
