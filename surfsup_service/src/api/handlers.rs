//! Route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Html;

use super::ApiError;
use crate::logging::{self, DataSource};
use crate::model::{PrecipitationByDate, QueryError, TemperatureSummary};
use crate::query::QueryService;

/// Runs a query on the blocking pool and logs failures by classification.
async fn run_query<T, F>(operation: &'static str, service: QueryService, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&QueryService) -> Result<T, QueryError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            tracing::error!(source = %DataSource::Http, operation, "query task failed: {}", e);
            ApiError::Task(e.to_string())
        })?;

    result.map_err(|err| {
        logging::log_query_failure(DataSource::Http, operation, &err);
        ApiError::from(err)
    })
}

/// HTML line-per-route listing served at `/`.
pub fn render_index(routes: &[&str]) -> String {
    let mut page = String::from("Available Routes:<br/>");
    for route in routes {
        page.push_str(route);
        page.push_str("<br/>");
    }
    page
}

pub async fn index(State(service): State<QueryService>) -> Html<String> {
    Html(render_index(service.list_routes()))
}

pub async fn precipitation(
    State(service): State<QueryService>,
) -> Result<Json<PrecipitationByDate>, ApiError> {
    run_query("precipitation", service, |s| s.precipitation())
        .await
        .map(Json)
}

pub async fn stations(State(service): State<QueryService>) -> Result<Json<Vec<String>>, ApiError> {
    run_query("stations", service, |s| s.stations()).await.map(Json)
}

pub async fn tobs(State(service): State<QueryService>) -> Result<Json<Vec<f64>>, ApiError> {
    run_query("tobs", service, |s| s.recent_temperatures())
        .await
        .map(Json)
}

pub async fn summary_from(
    State(service): State<QueryService>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    run_query("summary_from", service, move |s| {
        s.temperature_summary(&start, None)
    })
    .await
    .map(Json)
}

pub async fn summary_between(
    State(service): State<QueryService>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    run_query("summary_between", service, move |s| {
        s.temperature_summary(&start, Some(&end))
    })
    .await
    .map(Json)
}
