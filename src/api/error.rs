use crate::application::loan::LoanApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanApplicationError);

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found
            LoanApplicationError::LoanNotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Loan not found".to_string(),
            ),

            // 409 Conflict - 現在の状態と矛盾する操作
            LoanApplicationError::AlreadyReturned => (
                StatusCode::CONFLICT,
                "ALREADY_RETURNED",
                "Loan has already been returned".to_string(),
            ),
            LoanApplicationError::ItemUnavailable => (
                StatusCode::CONFLICT,
                "ITEM_UNAVAILABLE",
                "Stock item is already on loan".to_string(),
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            LoanApplicationError::BorrowerSuspended(until) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BORROWER_SUSPENDED",
                match until {
                    Some(until) => format!("Borrower has a late return penalty until {}", until),
                    None => "Borrower has an open-ended penalty".to_string(),
                },
            ),
            LoanApplicationError::InvalidDates(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_DATES", msg)
            }

            // 400 Bad Request
            LoanApplicationError::InvalidPagination(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAGINATION", msg)
            }

            // 503 / 500 - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LoanApplicationError::TransportFailure(e) => {
                tracing::error!("Transport failure: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TRANSPORT_FAILURE",
                    "Loan storage is unavailable, try again".to_string(),
                )
            }
            LoanApplicationError::PenaltyStoreError(e) => {
                tracing::error!("Penalty store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PENALTY_STORE_ERROR",
                    "Failed to access penalties".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
