//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::config::is_year_month;
use crate::settlement::{ReportError, SettlementEngine};

use super::AppState;
use super::types::{ErrorResponse, ReportQuery, VppSummary};

/// Lists every registered VPP with its site and battery counts.
///
/// `GET /vpps` → 200 + `Vec<VppSummary>` JSON
pub async fn get_vpps(State(state): State<Arc<AppState>>) -> Json<Vec<VppSummary>> {
    let registry = &state.registry;
    let summaries = registry
        .vpps()
        .iter()
        .map(|vpp| {
            let site_count = registry
                .sites()
                .iter()
                .filter(|site| site.vpp_name == vpp.name)
                .count();
            let battery_count = registry
                .batteries()
                .iter()
                .filter(|battery| {
                    registry
                        .find_site_by_nmi(&battery.nmi)
                        .is_ok_and(|site| site.vpp_name == vpp.name)
                })
                .count();
            VppSummary {
                name: vpp.name.clone(),
                revenue_percentage: vpp.revenue_percentage,
                daily_fee: vpp.daily_fee,
                site_count,
                battery_count,
            }
        })
        .collect();
    Json(summaries)
}

/// Computes the settlement report for one VPP and month.
///
/// `GET /report?vpp=NAME&month=YYYY-MM` → 200 + report JSON
/// Malformed month → 400, unknown VPP or nmi → 404,
/// zero total battery capacity → 422, each with an `ErrorResponse`.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    if !is_year_month(&query.month) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("month \"{}\" must be \"YYYY-MM\"", query.month),
            }),
        ));
    }

    let engine = SettlementEngine::new(&state.registry);
    match engine.create_report(&state.events, &query.vpp, &query.month) {
        Ok(report) => Ok(Json(report)),
        Err(e @ ReportError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e @ ReportError::InvalidState(_)) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
