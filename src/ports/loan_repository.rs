use crate::domain::{
    LoanId, Page, Pagination,
    loan::{Loan, NewLoan},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// 永続化コラボレーターのエラー
///
/// NotFound / AlreadyReturned / ItemUnavailable は業務上の拒否、
/// Transport は呼び出し自体が完了しなかったことを表す。
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 貸出（または参照先）が存在しない
    #[error("Loan not found")]
    NotFound,

    /// 既に実返却日が設定されている
    #[error("Loan already returned")]
    AlreadyReturned,

    /// 在庫アイテムが貸出中
    #[error("Stock item is already on loan")]
    ItemUnavailable,

    /// 通信・タイムアウトなど
    #[error("Persistence collaborator unavailable")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// 貸出リポジトリポート
///
/// 貸出の採番・永続化・返却の排他制御は実装側の責務。
/// ステータスは保持しないため、一覧の結果は呼び出し側で評価する。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 貸出を作成する
    ///
    /// 在庫アイテムが貸出中の場合は`ItemUnavailable`。
    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan>;

    /// 実返却日を設定する
    ///
    /// 存在しなければ`NotFound`、既に返却済みなら`AlreadyReturned`。
    /// 同じ貸出への同時返却は1件だけが成功しなければならない。
    async fn return_loan(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Loan>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 未返却の貸出を取得する（延滞かどうかは問わない）
    ///
    /// 貸出日の新しい順。
    async fn list_active_loans(&self, pagination: Pagination) -> Result<Page<Loan>>;

    /// 全貸出の履歴を取得する
    ///
    /// 貸出日の新しい順。
    async fn list_loans(&self, pagination: Pagination) -> Result<Page<Loan>>;
}
