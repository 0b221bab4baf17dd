use axum::{extract::State, routing::{get, post}, Json, Router};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use shared::shared_wheel_game::{WheelSpinResponse, WheelView};

use crate::error::AppResult;
use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wheel))
        .route("/spin", post(spin_wheel))
}

/// Current wheel state. A spin whose duration has passed is settled here if
/// its timer has not fired yet.
///
/// Spin deadlines are read from the tokio clock, the same clock the settle
/// timer sleeps on.
async fn get_wheel(State(state): State<AppState>) -> Json<WheelView> {
    let mut wheel = state.wheel();
    wheel.settle_if_elapsed(Instant::now().into_std(), state.economy.as_ref());
    Json(wheel.view())
}

async fn spin_wheel(State(state): State<AppState>) -> AppResult<Json<WheelSpinResponse>> {
    let ticket = {
        let mut wheel = state.wheel();
        let mut rng = rand::thread_rng();
        wheel.spin(state.economy.as_ref(), &mut rng, Instant::now().into_std())?
    };

    info!(
        "🎡 WHEEL SPIN: landing on '{}' ({} coins) in {} ms",
        ticket.segment.label,
        ticket.segment.payout,
        ticket.duration.as_millis()
    );
    schedule_settle(state.clone(), ticket.duration);

    let spins_left = state.economy.balances().spins;
    Ok(Json(WheelSpinResponse::new(&ticket, spins_left)))
}

// The single scheduled completion for a spin. A timer left over from an
// earlier spin finds the deadline of the current one not yet reached.
fn schedule_settle(state: AppState, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let mut wheel = state.wheel();
        wheel.settle_if_elapsed(Instant::now().into_std(), state.economy.as_ref());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shared::Balances;

    use crate::services::ads::MockRewardProvider;
    use crate::services::economy::EconomyEngine;
    use crate::storage::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_timer_settles_after_spin_duration() {
        let economy = Arc::new(EconomyEngine::new(Arc::new(MemoryStore::new()), Balances::default()));
        economy.load().await;
        let ads = Arc::new(MockRewardProvider::new(Duration::ZERO, true));
        let state = AppState::new(economy, ads, Duration::from_secs(4));

        let Json(spin) = spin_wheel(State(state.clone())).await.unwrap();
        assert!(state.wheel().is_spinning());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(state.wheel().is_spinning());
        assert_eq!(state.economy.balances().coins, 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!state.wheel().is_spinning());
        assert_eq!(state.economy.balances().coins, spin.payout);
    }
}
