use chrono::NaiveDate;
use thiserror::Error;

/// 貸出作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateLoanError {
    /// 返却予定日が貸出日より前
    #[error("expected return date {expected_return_date} is before loan date {loan_date}")]
    DueDateBeforeLoanDate {
        loan_date: NaiveDate,
        expected_return_date: NaiveDate,
    },
    /// 既定の返却予定日が日付の表現範囲を超える
    #[error("default due date for loan date {loan_date} is out of range")]
    DueDateOutOfRange { loan_date: NaiveDate },
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnLoanError {
    /// 既に返却済み
    #[error("loan was already returned on {0}")]
    AlreadyReturned(NaiveDate),
    /// 返却日が貸出日より前
    #[error("return date {return_date} is before loan date {loan_date}")]
    ReturnBeforeLoanDate {
        loan_date: NaiveDate,
        return_date: NaiveDate,
    },
}
