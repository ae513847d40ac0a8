//! HTTP surface of the climate API.
//!
//! Thin axum layer over `QueryService`: routing, JSON encoding, and mapping
//! query failures onto status codes. Handlers run the blocking repository
//! reads on tokio's blocking pool.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::query::QueryService;

/// Builds the application router with the query service as shared state.
///
/// Static segments win over captures, so `/api/v1.0/stations` never reaches
/// the `{start}` handler.
pub fn router(service: QueryService) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/v1.0/precipitation", get(handlers::precipitation))
        .route("/api/v1.0/stations", get(handlers::stations))
        .route("/api/v1.0/tobs", get(handlers::tobs))
        .route("/api/v1.0/{start}", get(handlers::summary_from))
        .route("/api/v1.0/{start}/{end}", get(handlers::summary_between))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
