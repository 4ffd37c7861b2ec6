//! Common routes: health, readiness, version.

use crate::dao::Dao;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on one store ping from `/ready`.
const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    store: &'static str,
}

type Daos = Arc<Vec<Arc<dyn Dao>>>;

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(daos): State<Daos>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    for dao in daos.iter() {
        let reachable = matches!(tokio::time::timeout(PING_TIMEOUT, dao.ping()).await, Ok(Ok(())));
        if !reachable {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyBody {
                    status: "degraded",
                    store: "unavailable",
                }),
            ));
        }
    }
    Ok(Json(ReadyBody {
        status: "ok",
        store: "ok",
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes plus GET /ready, which pings the store behind every given dao.
pub fn common_routes_with_ready(daos: Vec<Arc<dyn Dao>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(Arc::new(daos))
}
