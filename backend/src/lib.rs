use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tower_http::cors::CorsLayer;

use shared::shared_scratch_game::ScratchCard;
use shared::shared_wheel_game::WheelGame;

use crate::games::{backend_scratch_game, backend_wheel_game};
use crate::services::ads::RewardProvider;
use crate::services::economy::EconomyEngine;

pub mod config;
pub mod error;
pub mod games;
pub mod handlers;
pub mod logging;
pub mod services;
pub mod storage;

#[derive(Clone)]
pub struct AppState {
    pub economy: Arc<EconomyEngine>,
    pub ads: Arc<dyn RewardProvider>,
    wheel: Arc<Mutex<WheelGame>>,
    scratch: Arc<Mutex<ScratchCard>>,
}

impl AppState {
    pub fn new(economy: Arc<EconomyEngine>, ads: Arc<dyn RewardProvider>, spin_duration: Duration) -> Self {
        Self {
            economy,
            ads,
            wheel: Arc::new(Mutex::new(WheelGame::with_duration(spin_duration))),
            scratch: Arc::new(Mutex::new(ScratchCard::new(&mut rand::thread_rng()))),
        }
    }

    // Guards are never held across an await.
    pub(crate) fn wheel(&self) -> MutexGuard<'_, WheelGame> {
        self.wheel.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn scratch_card(&self) -> MutexGuard<'_, ScratchCard> {
        self.scratch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health_check", get(handlers::health_check))
        .route("/balance", get(handlers::get_balance))
        .route("/rewards/spins", post(handlers::refill_spins))
        .route("/rewards/scratches", post(handlers::refill_scratches))
        .route("/ads/pending", get(handlers::pending_ad))
        .route("/ads/:ticket", post(handlers::complete_ad));

    Router::new()
        .nest("/api", api_routes)
        .nest("/wheel", backend_wheel_game::create_router())
        .nest("/scratch", backend_scratch_game::create_router())
        .route("/withdrawal/methods", get(handlers::withdrawal_methods))
        .route("/withdrawal", post(handlers::request_withdrawal))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
