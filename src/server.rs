use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::catalog::source::load_dataset;
use crate::catalog::{available_companies, max_premium, InsuranceData};
use crate::config::Config;
use crate::filters::query::FilterQuery;
use crate::pipeline::Comparison;
use crate::report::export::{report_file_name, today};
use crate::report::{build_print_table, PrintMode, PrintTable};

const MODE_KEY: &str = "mode";

#[derive(Clone)]
struct ApiState {
    config: Config,
    data: Arc<InsuranceData>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    offers: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonResponse {
    #[serde(flatten)]
    comparison: Comparison,
    query: String,
    companies: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    file_name: String,
    table: PrintTable,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let data = load_dataset(&config).await?;
    let app = router(ApiState {
        config,
        data: Arc::new(data),
    });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/insurances", get(insurances))
        .route("/api/comparison", get(comparison))
        .route("/api/report", get(report))
        .route("/api/config", get(show_config))
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        offers: state.data.offers.len(),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

/// Raw dataset, served after the configured latency like a remote backend would.
async fn insurances(State(state): State<ApiState>) -> Json<InsuranceData> {
    let latency = state.config.server.simulated_latency_ms;
    if latency > 0 {
        tokio::time::sleep(Duration::from_millis(latency)).await;
    }
    Json(state.data.as_ref().clone())
}

async fn comparison(
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<ComparisonResponse> {
    let query = FilterQuery::parse(raw.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let ceiling = max_premium(&state.data.offers);
    let filters = query.to_filters(ceiling);
    debug!(query = %query.to_query_string(), "comparison requested");

    let comparison = Comparison::run(&state.data, filters);
    Ok(ok(ComparisonResponse {
        query: FilterQuery::from_filters(&comparison.filters, ceiling).to_query_string(),
        companies: available_companies(&state.data.offers),
        comparison,
    }))
}

/// Same filter parsing as `/api/comparison`, with `mode` as the only extra key.
async fn report(
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<ReportResponse> {
    let (query, extras) =
        FilterQuery::parse_with_extra(raw.as_deref().unwrap_or_default(), &[MODE_KEY])
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let mode = match extras.get(MODE_KEY) {
        Some(raw) => raw
            .parse::<PrintMode>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => state.config.report.default_mode,
    };
    let filters = query.to_filters(max_premium(&state.data.offers));
    let comparison = Comparison::run(&state.data, filters);
    let categories = mode.categories(&state.data.categories, &comparison.filters);

    Ok(ok(ReportResponse {
        file_name: report_file_name(mode, today(), "pdf"),
        table: build_print_table(mode, &comparison.offers, &categories),
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}
