use crate::application::loan::{
    self, LoanReport, ServiceDependencies, create_loan as execute_create_loan,
    return_loan as execute_return_loan,
};
use crate::domain::{self, LoanId, commands::ReturnLoan, loan::LoanView};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        CreateLoanRequest, EvaluationQuery, ListLoansQuery, LoanPageResponse, ReturnLoanRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 返却予定日は貸出日以降であること
/// - 利用者が延滞ペナルティ中でないこと
/// - 在庫アイテムが貸出中でないこと
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanView>), ApiError> {
    let cmd = req.to_command()?;
    let view = execute_create_loan(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /loans/:id/return - 貸出を返却
///
/// ボディは省略可能。返却日の省略時は当日。
/// 解釈できないボディは422とし、返却は行わない。
/// 返却済みの貸出に対しては409を返す（成功扱いにはしない）。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<i64>,
    body: Bytes,
) -> Result<Json<LoanView>, ApiError> {
    let req = ReturnLoanRequest::from_body(&body)?;

    let cmd = ReturnLoan {
        loan_id: LoanId::new(loan_id),
        return_date: req.return_date,
    };

    let view = execute_return_loan(&state.service_deps, cmd).await?;
    Ok(Json(view))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans/:id - 貸出詳細をIDで取得
pub async fn get_loan_by_id(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<i64>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<LoanView>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(domain::today);
    let view = loan::get_loan(&state.service_deps, LoanId::new(loan_id), as_of).await?;
    Ok(Json(view))
}

/// GET /loans - 貸出一覧
///
/// クエリパラメータ:
/// - page, size: ページ指定（既定 1, 10、sizeは最大100）
/// - activeOnly: 未返却の貸出のみ
/// - asOf: ステータスの評価日（既定は当日）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<LoanPageResponse>, ApiError> {
    let pagination = query.pagination()?;
    let as_of = query.as_of.unwrap_or_else(domain::today);

    let page = if query.active_only {
        loan::list_active_loans(&state.service_deps, pagination, as_of).await?
    } else {
        loan::list_loans(&state.service_deps, pagination, as_of).await?
    };

    Ok(Json(LoanPageResponse::from(page)))
}

/// GET /loans/overdue - 延滞中の貸出一覧
pub async fn list_overdue_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<Vec<LoanView>>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(domain::today);
    let loans = loan::list_overdue_loans(&state.service_deps, as_of).await?;
    Ok(Json(loans))
}

/// GET /loans/report - 貸出状況のサマリー
pub async fn loan_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<LoanReport>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(domain::today);
    let report = loan::loan_report(&state.service_deps, as_of).await?;
    Ok(Json(report))
}
