use crate::domain::{
    MAX_PAGE_SIZE, Pagination,
    loan::{LoanStatus, LoanView},
};
use chrono::NaiveDate;
use serde::Serialize;

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 延滞中の貸出一覧（評価日時点）
///
/// コラボレーターは未返却の貸出しか返さないため、延滞かどうかは
/// ここで日付から導出する。全ページを走査し、返却予定日の古い順に並べる。
pub async fn list_overdue_loans(
    deps: &ServiceDependencies,
    as_of: NaiveDate,
) -> Result<Vec<LoanView>> {
    let mut pagination = Pagination::new(1, MAX_PAGE_SIZE)
        .map_err(|e| LoanApplicationError::InvalidPagination(e.to_string()))?;
    let mut overdue = Vec::new();

    loop {
        let page = deps.loan_repository.list_active_loans(pagination).await?;
        let has_more = page.has_more() && !page.items.is_empty();

        overdue.extend(
            page.items
                .into_iter()
                .map(|loan| LoanView::evaluate(loan, as_of))
                .filter(|view| view.status == LoanStatus::Overdue),
        );

        if !has_more {
            break;
        }
        pagination = pagination.next();
    }

    overdue.sort_by_key(|view| (view.loan.expected_return_date, view.loan.id));

    tracing::debug!(count = overdue.len(), as_of = %as_of, "overdue loans evaluated");

    Ok(overdue)
}

/// 貸出状況のサマリー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanReport {
    pub total: u64,
    pub active: u64,
    pub overdue: u64,
    pub returned: u64,
}

/// 貸出状況のサマリーを評価日時点で集計する
///
/// activeは延滞を含まない（Active/Overdue/Returnedは排他）。
///
/// 3つの読み取りは独立して並行に行うため、スナップショットではない。
/// 集計中に貸出・返却が行われると各件数の合計がtotalと一致しないことがある
/// （減算は0で打ち切る）。
pub async fn loan_report(deps: &ServiceDependencies, as_of: NaiveDate) -> Result<LoanReport> {
    let count_only = Pagination::new(1, 1)
        .map_err(|e| LoanApplicationError::InvalidPagination(e.to_string()))?;

    let (all, open, overdue) = futures::try_join!(
        async {
            deps.loan_repository
                .list_loans(count_only)
                .await
                .map_err(LoanApplicationError::from)
        },
        async {
            deps.loan_repository
                .list_active_loans(count_only)
                .await
                .map_err(LoanApplicationError::from)
        },
        list_overdue_loans(deps, as_of),
    )?;

    let overdue = overdue.len() as u64;

    Ok(LoanReport {
        total: all.total,
        active: open.total.saturating_sub(overdue),
        overdue,
        returned: all.total.saturating_sub(open.total),
    })
}
