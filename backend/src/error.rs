use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use shared::constants::AD_UNAVAILABLE_ERROR;
use shared::shared_scratch_game::ScratchRejection;
use shared::shared_wheel_game::SpinRejection;
use shared::withdrawal::WithdrawalError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Spin(#[from] SpinRejection),
    #[error("{0}")]
    Scratch(#[from] ScratchRejection),
    #[error("{0}")]
    Withdrawal(#[from] WithdrawalError),
    #[error("You have {0} spin(s) available. Use them first!")]
    HasSpins(u64),
    #[error("{}", AD_UNAVAILABLE_ERROR)]
    AdUnavailable,
    #[error("no pending ad with that ticket")]
    UnknownAd,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Spin(SpinRejection::OutOfSpins) => (StatusCode::CONFLICT, "out_of_spins"),
            AppError::Spin(SpinRejection::Spinning) => (StatusCode::CONFLICT, "spinning"),
            AppError::Scratch(ScratchRejection::OutOfCredits) => (StatusCode::CONFLICT, "out_of_scratches"),
            AppError::Withdrawal(WithdrawalError::MissingMethod) => (StatusCode::BAD_REQUEST, "select_method"),
            AppError::Withdrawal(WithdrawalError::MissingFields(_)) => (StatusCode::BAD_REQUEST, "missing_fields"),
            AppError::Withdrawal(WithdrawalError::BelowMinimum { .. }) => (StatusCode::BAD_REQUEST, "below_minimum"),
            AppError::HasSpins(_) => (StatusCode::CONFLICT, "has_spins"),
            AppError::AdUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "ad_unavailable"),
            AppError::UnknownAd => (StatusCode::NOT_FOUND, "unknown_ad"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        (status, Json(json!({ "error": self.to_string(), "code": code }))).into_response()
    }
}
