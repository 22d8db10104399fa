//! Transfer submission and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ReferenceId, Status};
use serde::{Deserialize, Serialize};
use transfer::TransferRequest;

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateTransferRequest {
    /// Caller-chosen reference; a UUID is generated when absent.
    pub reference_id: Option<String>,
    pub source_account_id: String,
    pub target_account_id: String,
    pub amount: i64,
}

#[derive(Serialize)]
pub struct TransferAcceptedResponse {
    pub reference_id: ReferenceId,
    pub status: Status,
}

#[derive(Serialize)]
pub struct TransferStatusResponse {
    pub reference_id: ReferenceId,
    pub status: Status,
    pub terminal: bool,
}

/// POST /transfers — submit a new transfer.
#[tracing::instrument(skip(state, payload), fields(reference_id = tracing::field::Empty))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferAcceptedResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let reference_id = req
        .reference_id
        .map(ReferenceId::new)
        .unwrap_or_else(ReferenceId::generate);
    tracing::Span::current().record("reference_id", reference_id.as_str());

    let request = TransferRequest::new(
        reference_id,
        req.source_account_id,
        req.target_account_id,
        req.amount,
    );
    let reference_id = state.worker.start_transfer(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TransferAcceptedResponse {
            reference_id,
            status: Status::Started,
        }),
    ))
}

/// GET /transfers/{reference_id} — current status of a transfer.
///
/// A reference that was never written reports `Started`.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(reference_id): Path<String>,
) -> Result<Json<TransferStatusResponse>, ApiError> {
    let reference_id = ReferenceId::new(reference_id);
    let status = state.worker.status(&reference_id).await?;

    Ok(Json(TransferStatusResponse {
        reference_id,
        status,
        terminal: status.is_terminal(),
    }))
}
