use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_loan, get_loan_by_id, list_loans, list_overdue_loans, loan_report,
    return_loan,
};

/// Creates the API router with all loan endpoints
///
/// Command endpoints:
/// - POST /loans - Create a new loan
/// - POST /loans/:id/return - Return a loan
///
/// Query endpoints:
/// - GET /loans - List loans (paginated, optionally only unreturned)
/// - GET /loans/overdue - List overdue loans
/// - GET /loans/report - Loan counts per status
/// - GET /loans/:id - Get loan details
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/loans", post(create_loan).get(list_loans))
        .route("/loans/overdue", get(list_overdue_loans))
        .route("/loans/report", get(loan_report))
        .route("/loans/:id", get(get_loan_by_id))
        .route("/loans/:id/return", post(return_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
