use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use shared::balance::{BalanceResponse, RefillResponse};
use shared::constants::{AD_REFILL_SCRATCHES, AD_REFILL_SPINS};
use shared::withdrawal::{payout_methods, PayoutMethodInfo, WithdrawalReceipt, WithdrawalRequest};

use crate::error::{AppError, AppResult};
use crate::services::rewards;
use crate::AppState;

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn get_balance(State(state): State<AppState>) -> Json<BalanceResponse> {
    Json(state.economy.snapshot().into())
}

/// Home screen "watch ad for spins". Resolves once the ad does.
pub async fn refill_spins(State(state): State<AppState>) -> AppResult<Json<RefillResponse>> {
    rewards::refill_spins(&state.economy, state.ads.as_ref()).await?;
    Ok(Json(RefillResponse {
        message: format!("You earned {} free spins!", AD_REFILL_SPINS),
        balance: state.economy.snapshot().into(),
    }))
}

pub async fn refill_scratches(State(state): State<AppState>) -> AppResult<Json<RefillResponse>> {
    rewards::refill_scratches(&state.economy, state.ads.as_ref()).await?;
    Ok(Json(RefillResponse {
        message: format!("You earned {} free scratch cards!", AD_REFILL_SCRATCHES),
        balance: state.economy.snapshot().into(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingAdResponse {
    pub ticket: Option<Uuid>,
}

/// Polled by the ad SDK bridge to find the ad it should show.
pub async fn pending_ad(State(state): State<AppState>) -> Json<PendingAdResponse> {
    Json(PendingAdResponse {
        ticket: state.ads.pending_ticket(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdOutcome {
    pub earned: bool,
}

pub async fn complete_ad(
    State(state): State<AppState>,
    Path(ticket): Path<Uuid>,
    Json(outcome): Json<AdOutcome>,
) -> AppResult<StatusCode> {
    if state.ads.complete(ticket, outcome.earned) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        debug!("Outcome reported for unknown ad {}", ticket);
        Err(AppError::UnknownAd)
    }
}

pub async fn withdrawal_methods() -> Json<Vec<PayoutMethodInfo>> {
    Json(payout_methods())
}

/// Validates a withdrawal form against the current coin balance. Nothing is
/// deducted or recorded.
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Json(request): Json<WithdrawalRequest>,
) -> AppResult<Json<WithdrawalReceipt>> {
    let receipt = request.validate(state.economy.balances().coins)?;
    info!("💸 WITHDRAWAL: ${} via {}", receipt.amount, receipt.method);
    Ok(Json(receipt))
}
