use crate::domain::{
    self, LoanId, Page, Pagination,
    commands::{CreateLoan, ReturnLoan},
    loan::LoanView,
    penalty,
};
use crate::ports::*;
use chrono::NaiveDate;
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_repository: Arc<dyn LoanRepository>,
    pub penalty_store: Arc<dyn PenaltyStore>,
}

/// 貸出を作成する
///
/// ビジネスルール：
/// - 返却予定日は貸出日より前にできない
/// - 貸出日時点で延滞ペナルティ中の利用者には貸し出さない
/// - 在庫アイテムが貸出中なら拒否（コラボレーター側で判定）
///
/// # 戻り値
/// 作成された貸出を貸出日時点で評価したビュー
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<LoanView> {
    // 1. ドメイン層の純粋関数で貸出を組み立て
    let new_loan = domain::loan::plan_loan(&cmd, domain::today())
        .map_err(|e| LoanApplicationError::InvalidDates(e.to_string()))?;

    // 2. 利用者の貸出停止確認
    let penalties = deps
        .penalty_store
        .active_for_borrower(new_loan.borrower_id, new_loan.loan_date)
        .await
        .map_err(LoanApplicationError::PenaltyStoreError)?;

    if let Some(until) = penalty::suspended_until(&penalties, new_loan.loan_date) {
        return Err(LoanApplicationError::BorrowerSuspended(until));
    }

    // 3. コラボレーターに作成を委譲
    let loan_date = new_loan.loan_date;
    let loan = deps.loan_repository.create_loan(new_loan).await?;

    tracing::info!(
        loan_id = %loan.id,
        borrower_id = loan.borrower_id.value(),
        stock_item_id = loan.stock_item_id.value(),
        "loan created"
    );

    Ok(LoanView::evaluate(loan, loan_date))
}

/// 貸出を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 未返却であること（返却済みは`AlreadyReturned`として呼び出し元に返す）
/// - 返却日は貸出日より前にできない
/// - 延滞していても返却は受け付け、遅延日数分のペナルティを記録する
///
/// コラボレーターが書き込みを拒否した場合、ローカルには何も残さない。
/// ペナルティの記録失敗はログに残すのみで、返却結果には影響しない。
///
/// # 戻り値
/// 返却日時点で評価したビュー（ステータスは常にReturned）
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<LoanView> {
    let return_date = cmd.return_date.unwrap_or_else(domain::today);

    // 1. 現在の貸出を取得
    let loan = deps
        .loan_repository
        .get_by_id(cmd.loan_id)
        .await?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    // 2. ドメイン層の純粋関数で遷移を検証
    let returned = domain::loan::return_loan(&loan, return_date).map_err(|e| match e {
        domain::ReturnLoanError::AlreadyReturned(_) => LoanApplicationError::AlreadyReturned,
        other => LoanApplicationError::InvalidDates(other.to_string()),
    })?;

    // 3. コラボレーターに書き込みを委譲（同時返却の排他はコラボレーター側）
    let stored = deps
        .loan_repository
        .return_loan(cmd.loan_id, return_date)
        .await
        .inspect_err(|e| tracing::warn!(loan_id = %cmd.loan_id, error = %e, "return rejected"))?;

    tracing::info!(
        loan_id = %stored.id,
        return_date = %return_date,
        days_late = returned.days_late,
        "loan returned"
    );

    // 4. 延滞返却ならペナルティを記録
    // 返却は確定済みのため、記録に失敗しても返却自体は成功として返す
    if let Some(new_penalty) = penalty::late_penalty(&returned) {
        let borrower_id = new_penalty.borrower_id;
        match deps.penalty_store.record(new_penalty).await {
            Ok(recorded) => tracing::info!(
                borrower_id = recorded.borrower_id.value(),
                ends_on = ?recorded.ends_on,
                "late return penalty recorded"
            ),
            Err(e) => tracing::error!(
                loan_id = %stored.id,
                borrower_id = borrower_id.value(),
                days_late = returned.days_late,
                error = %e,
                "failed to record late return penalty"
            ),
        }
    }

    Ok(LoanView::evaluate(stored, return_date))
}

/// IDで貸出を取得し、評価日時点で評価する
pub async fn get_loan(
    deps: &ServiceDependencies,
    loan_id: LoanId,
    as_of: NaiveDate,
) -> Result<LoanView> {
    let loan = deps
        .loan_repository
        .get_by_id(loan_id)
        .await?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    Ok(LoanView::evaluate(loan, as_of))
}

/// 未返却の貸出一覧（ステータスは評価日時点で導出）
pub async fn list_active_loans(
    deps: &ServiceDependencies,
    pagination: Pagination,
    as_of: NaiveDate,
) -> Result<Page<LoanView>> {
    let page = deps.loan_repository.list_active_loans(pagination).await?;
    Ok(page.map(|loan| LoanView::evaluate(loan, as_of)))
}

/// 全貸出の履歴（ステータスは評価日時点で導出）
pub async fn list_loans(
    deps: &ServiceDependencies,
    pagination: Pagination,
    as_of: NaiveDate,
) -> Result<Page<LoanView>> {
    let page = deps.loan_repository.list_loans(pagination).await?;
    Ok(page.map(|loan| LoanView::evaluate(loan, as_of)))
}
