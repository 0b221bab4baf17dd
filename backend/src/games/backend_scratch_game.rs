use axum::{extract::State, routing::{get, post}, Json, Router};
use tracing::info;

use shared::shared_scratch_game::{ScratchCard, ScratchTouchRequest, ScratchTouchResponse, ScratchUpdate, ScratchView};

use crate::error::AppResult;
use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_card))
        .route("/new", post(new_card))
        .route("/touch", post(touch_card))
}

async fn get_card(State(state): State<AppState>) -> Json<ScratchView> {
    Json(state.scratch_card().view())
}

/// "Play again": discards the current card and deals a fresh one.
async fn new_card(State(state): State<AppState>) -> Json<ScratchView> {
    let mut card = state.scratch_card();
    *card = ScratchCard::new(&mut rand::thread_rng());
    Json(card.view())
}

/// Applies one touch or drag. The first touch on a card consumes a scratch
/// card credit.
async fn touch_card(
    State(state): State<AppState>,
    Json(request): Json<ScratchTouchRequest>,
) -> AppResult<Json<ScratchTouchResponse>> {
    let (update, coverage) = {
        let mut card = state.scratch_card();
        let update = card.touch_stroke(&request.points, state.economy.as_ref())?;
        (update, card.coverage())
    };

    if let ScratchUpdate::Revealed { prize } = update {
        info!("🪙 SCRATCH CARD: revealed {} coins", prize);
    }

    let scratches_left = state.economy.balances().scratches;
    Ok(Json(ScratchTouchResponse::new(update, coverage, scratches_left)))
}
