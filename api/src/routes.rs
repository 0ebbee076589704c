use std::sync::Arc;

use crate::helpers;
use crate::pipelines;
use crate::types;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use latency_harness::orchestrator::Simulator;
use log::{error, info};

/// Read-only report routes.
pub(crate) fn report_routes() -> Router<Arc<Simulator>> {
    Router::new()
        .route("/", get(report_page))
        .route("/logs", get(list_logs))
}

/// The simulation trigger; kept separate so it can carry its own rate limit.
pub(crate) fn trigger_routes() -> Router<Arc<Simulator>> {
    Router::new().route("/simulate", get(simulate))
}

/// Renders the result log as a sortable HTML table.
///
/// # Arguments
/// * `simulator` - Shared orchestration context provided by Axum state.
/// * `params` - `sort_by` / `sort_order`; unknown values fall back to label ascending.
///
/// # Returns
/// * `(StatusCode::OK, html)` with a short-lived cache header.
/// * `(StatusCode::INTERNAL_SERVER_ERROR, detail)` when the result log cannot be read.
pub(crate) async fn report_page(
    State(simulator): State<Arc<Simulator>>,
    Query(params): Query<types::ReportParams>,
) -> Response {
    let (column, direction) = params.resolve();
    match pipelines::list_rows(simulator, column, direction).await {
        Ok(rows) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, helpers::REPORT_CACHE_CONTROL)],
            Html(helpers::render_report(&rows, column, direction)),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to read latency logs: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err).into_response()
        }
    }
}

/// Same listing as [`report_page`], serialized as a JSON array.
pub(crate) async fn list_logs(
    State(simulator): State<Arc<Simulator>>,
    Query(params): Query<types::ReportParams>,
) -> Response {
    let (column, direction) = params.resolve();
    match pipelines::list_rows(simulator, column, direction).await {
        Ok(rows) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, helpers::REPORT_CACHE_CONTROL)],
            Json(rows),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to read latency logs: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err).into_response()
        }
    }
}

/// Runs every simulation and redirects to the report.
///
/// # Returns
/// * `303 See Other` to `/` once all rows are committed.
/// * `(StatusCode::INTERNAL_SERVER_ERROR, detail)` with the raw error; the previous report stays.
pub(crate) async fn simulate(State(simulator): State<Arc<Simulator>>) -> Response {
    info!("Simulation run requested");
    match pipelines::run_simulations(simulator).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            error!("Simulation run failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use latency_harness::catalog::{Backend, BackendCatalog};
    use latency_harness::config::HarnessConfig;
    use latency_harness::results::ResultStore;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(config: &HarnessConfig) -> Router {
        let store = Arc::new(ResultStore::open(&config.database_path).unwrap());
        let simulator = Simulator::new(BackendCatalog::from_config(config), store)
            .with_workload_seed(11);
        Router::new()
            .merge(report_routes())
            .merge(trigger_routes())
            .with_state(Arc::new(simulator))
    }

    fn config(dir: &TempDir, remotes: bool) -> HarnessConfig {
        let mut config = HarnessConfig {
            database_path: dir.path().join("latency.sqlite"),
            ..HarnessConfig::default()
        };
        if remotes {
            for backend in &Backend::ALL[1..] {
                let path = dir.path().join(format!("{}.sqlite", backend.name()));
                config = config.with_remote_url(*backend, format!("sqlite://{}", path.display()));
            }
        }
        config
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn report_tolerates_bogus_sort_parameters() {
        let dir = TempDir::new().unwrap();
        let (status, headers, body) =
            get(app(&config(&dir, false)), "/?sort_by=bogus&sort_order=sideways").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            helpers::REPORT_CACHE_CONTROL
        );
        assert!(body.contains("No results yet."));
    }

    #[tokio::test]
    async fn unconfigured_remote_fails_trigger_with_detail() {
        let dir = TempDir::new().unwrap();
        let (status, _, body) = get(app(&config(&dir, false)), "/simulate").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("SameBox"), "{body}");
    }

    #[tokio::test]
    async fn trigger_redirects_and_fills_report() {
        let dir = TempDir::new().unwrap();
        let app = app(&config(&dir, true));

        let (status, headers, _) = get(app.clone(), "/simulate").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/");

        let (status, _, body) = get(app, "/logs?sort_by=p95_latency&sort_order=desc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("\"label\"").count(), 15);
    }

    #[tokio::test]
    async fn simultaneous_triggers_both_complete() {
        let dir = TempDir::new().unwrap();
        let app = app(&config(&dir, true));

        let (first, second) = tokio::join!(
            get(app.clone(), "/simulate"),
            get(app.clone(), "/simulate")
        );
        assert_eq!(first.0, StatusCode::SEE_OTHER, "{}", first.2);
        assert_eq!(second.0, StatusCode::SEE_OTHER, "{}", second.2);

        let (_, _, body) = get(app, "/logs").await;
        assert_eq!(body.matches("\"label\"").count(), 15);
    }
}
