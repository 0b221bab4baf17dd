//! Ad-funded refills of spins and scratch cards.

use std::sync::Arc;
use tracing::info;

use shared::constants::{AD_REFILL_SCRATCHES, AD_REFILL_SPINS};
use shared::Balances;

use crate::error::{AppError, AppResult};
use crate::services::ads::RewardProvider;
use crate::services::economy::EconomyEngine;

/// Grants `AD_REFILL_SPINS` spins after a rewarded ad. Only offered once the
/// player has run out of spins.
pub async fn refill_spins(economy: &Arc<EconomyEngine>, ads: &dyn RewardProvider) -> AppResult<Balances> {
    let spins = economy.balances().spins;
    if spins > 0 {
        return Err(AppError::HasSpins(spins));
    }

    let grant = Arc::clone(economy);
    let earned = ads
        .show_rewarded_ad(Box::new(move || grant.add_spins(AD_REFILL_SPINS)))
        .await;
    if !earned {
        return Err(AppError::AdUnavailable);
    }

    info!("🎡 REFILL: +{} spins from rewarded ad", AD_REFILL_SPINS);
    Ok(economy.balances())
}

/// Grants `AD_REFILL_SCRATCHES` scratch cards after a rewarded ad.
pub async fn refill_scratches(economy: &Arc<EconomyEngine>, ads: &dyn RewardProvider) -> AppResult<Balances> {
    let grant = Arc::clone(economy);
    let earned = ads
        .show_rewarded_ad(Box::new(move || grant.add_scratches(AD_REFILL_SCRATCHES)))
        .await;
    if !earned {
        return Err(AppError::AdUnavailable);
    }

    info!("🪙 REFILL: +{} scratch cards from rewarded ad", AD_REFILL_SCRATCHES);
    Ok(economy.balances())
}
