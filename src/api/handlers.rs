use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::models::ValidationStats;
use crate::service::syncer::SyncOutcome;
use crate::service::ValidationService;

/// Request body for a validation run.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Path of the extracted SIAT CSV export.
    pub csv_path: String,
    /// Period start, YYYY-MM-DD.
    pub date_from: String,
    /// Period end, YYYY-MM-DD.
    pub date_to: String,
    /// MODALIDAD filter; defaults to the configured one (2 = INVENTARIOS).
    pub modality: Option<String>,
    /// When set, the multi-section CSV report is written here.
    pub report_dir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub message: String,
    pub passed: Option<bool>,
    pub stats: Option<ValidationStats>,
    pub decoded_rows: Option<usize>,
    pub failed_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub csv_path: String,
    pub date_from: String,
    pub date_to: String,
    pub modality: Option<String>,
    /// Transform and gate, but do not write.
    pub dry_run: Option<bool>,
    /// Caller-side override of the validation gate.
    pub force: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub passed: Option<bool>,
    pub outcome: Option<SyncOutcome>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn validate(
    State(service): State<Arc<ValidationService>>,
    Json(req): Json<ValidateRequest>,
) -> Response {
    let (date_from, date_to) = match parse_period(&req.date_from, &req.date_to) {
        Ok(period) => period,
        Err(e) => return error_response::<ValidateResponse>(&e),
    };
    let modality = req
        .modality
        .unwrap_or_else(|| service.default_modality().to_string());

    let run = service
        .run_validation(
            Path::new(&req.csv_path),
            date_from,
            date_to,
            &modality,
            req.report_dir.as_deref().map(Path::new),
        )
        .await;

    match run {
        Ok(run) => {
            let response = ValidateResponse {
                success: true,
                message: format!(
                    "validated {} SIAT rows against {} inventory rows",
                    run.stats.total_siat, run.stats.total_inventory
                ),
                passed: Some(run.stats.passes()),
                stats: Some(run.stats),
                decoded_rows: Some(run.decoded),
                failed_rows: Some(run.failed),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response::<ValidateResponse>(&e),
    }
}

pub async fn sync(
    State(service): State<Arc<ValidationService>>,
    Json(req): Json<SyncRequest>,
) -> Response {
    let (date_from, date_to) = match parse_period(&req.date_from, &req.date_to) {
        Ok(period) => period,
        Err(e) => return error_response::<SyncResponse>(&e),
    };
    let modality = req
        .modality
        .unwrap_or_else(|| service.default_modality().to_string());

    let run = service
        .run_sync(
            Path::new(&req.csv_path),
            date_from,
            date_to,
            &modality,
            req.dry_run.unwrap_or(false),
            req.force.unwrap_or(false),
        )
        .await;

    match run {
        Ok((run, outcome)) => {
            let response = SyncResponse {
                success: true,
                message: outcome.message.clone(),
                passed: Some(run.stats.passes()),
                outcome: Some(outcome),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response::<SyncResponse>(&e),
    }
}

fn parse_period(from: &str, to: &str) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ValidationError::BadRequest(format!("invalid date '{raw}'")))
    };
    Ok((parse(from)?, parse(to)?))
}

fn status_for(e: &ValidationError) -> StatusCode {
    match e {
        ValidationError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ValidationError::MissingColumn { .. }
        | ValidationError::DataType { .. }
        | ValidationError::Csv(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ValidationError::SyncRejected(_) => StatusCode::CONFLICT,
        ValidationError::LedgerNotConfigured => StatusCode::PRECONDITION_FAILED,
        ValidationError::Io(_) | ValidationError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response<T: ErrorBody>(e: &ValidationError) -> Response {
    tracing::error!(error = %e, "request failed");
    (status_for(e), Json(T::from_error(e))).into_response()
}

/// Shared shape for failure bodies.
trait ErrorBody: Serialize {
    fn from_error(e: &ValidationError) -> Self;
}

impl ErrorBody for ValidateResponse {
    fn from_error(e: &ValidationError) -> Self {
        Self {
            success: false,
            message: format!("Error: {e}"),
            passed: None,
            stats: None,
            decoded_rows: None,
            failed_rows: None,
        }
    }
}

impl ErrorBody for SyncResponse {
    fn from_error(e: &ValidationError) -> Self {
        Self {
            success: false,
            message: format!("Error: {e}"),
            passed: None,
            outcome: None,
        }
    }
}
