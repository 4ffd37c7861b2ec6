//! Route sets and the top-level application router.

pub mod common;
pub mod resource;

pub use common::common_routes_with_ready;
pub use resource::{register_base_routes, resource_routes, ResourceConfig, ResourceRouter};

use crate::error::AppError;
use axum::{
    http::{header, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

async fn not_found() -> AppError {
    AppError::NotFound("no such route".into())
}

/// The body limit layer rejects an oversized `Content-Length` with a plain-text 413; give it the
/// same error body as every other failure.
async fn structured_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return AppError::PayloadTooLarge.into_response();
    }
    response
}

/// Final application: registered resources, common routes, structured 404 for unknown paths,
/// request body limit.
pub fn app(resources: ResourceRouter, body_limit_bytes: usize) -> Router {
    let common = common_routes_with_ready(resources.daos().to_vec());
    Router::new()
        .merge(common)
        .merge(resources.into_router())
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(body_limit_bytes)))
        .layer(map_response(structured_payload_too_large))
}
