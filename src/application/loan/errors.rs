use crate::ports::RepositoryError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 貸出・利用者・在庫アイテムが存在しない
    #[error("Loan not found")]
    LoanNotFound,

    /// 返却済みの貸出を再度返却しようとした
    #[error("Loan already returned")]
    AlreadyReturned,

    /// 在庫アイテムが貸出中
    #[error("Stock item is already on loan")]
    ItemUnavailable,

    /// 利用者が延滞ペナルティにより貸出停止中（Noneは無期限）
    #[error("Borrower is suspended")]
    BorrowerSuspended(Option<chrono::NaiveDate>),

    /// 日付の組み合わせが不正
    #[error("Invalid dates: {0}")]
    InvalidDates(String),

    /// ページ指定が不正
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// 永続化コラボレーターへの呼び出しが完了しなかった
    #[error("Transport failure")]
    TransportFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// PenaltyStoreのエラー
    #[error("Penalty store error")]
    PenaltyStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<RepositoryError> for LoanApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => LoanApplicationError::LoanNotFound,
            RepositoryError::AlreadyReturned => LoanApplicationError::AlreadyReturned,
            RepositoryError::ItemUnavailable => LoanApplicationError::ItemUnavailable,
            RepositoryError::Transport(source) => LoanApplicationError::TransportFailure(source),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
