use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    BorrowerId, CreateLoanError, LoanId, ReturnLoanError, StockItemId,
    commands::{CreateLoan, DueDate},
};

/// 既定の貸出期間（日数）
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出ステータス
///
/// 永続化されない派生値。Returnedだけが「実返却日あり」という事実に対応し、
/// Active/Overdueは評価日ごとに日付から再計算される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み（終端状態）
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::Overdue => "Overdue",
            LoanStatus::Returned => "Returned",
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, LoanStatus::Overdue)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan - 1つの在庫アイテムの1回の貸出
///
/// ステータスは保持しない。常に3つの日付から導出する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub loan_date: NaiveDate,
    /// Noneは返却期限なし
    pub expected_return_date: Option<NaiveDate>,
    /// 一度設定されたら解除されない
    pub actual_return_date: Option<NaiveDate>,
    pub borrower_id: BorrowerId,
    pub stock_item_id: StockItemId,
}

/// 永続化前の貸出（IDは永続化側が採番する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub loan_date: NaiveDate,
    pub expected_return_date: Option<NaiveDate>,
    pub borrower_id: BorrowerId,
    pub stock_item_id: StockItemId,
}

/// 純粋関数：貸出作成コマンドから永続化前の貸出を組み立てる
///
/// ビジネスルール：
/// - 貸出日の省略時は評価日（当日）
/// - 返却予定日の省略時は貸出日 + 14日
/// - 返却予定日は貸出日より前にできない
pub fn plan_loan(cmd: &CreateLoan, today: NaiveDate) -> Result<NewLoan, CreateLoanError> {
    let loan_date = cmd.loan_date.unwrap_or(today);

    let expected_return_date = match cmd.due_date {
        DueDate::Default => Some(
            loan_date
                .checked_add_signed(Duration::days(DEFAULT_LOAN_PERIOD_DAYS))
                .ok_or(CreateLoanError::DueDateOutOfRange { loan_date })?,
        ),
        DueDate::On(date) => Some(date),
        DueDate::None => None,
    };

    if let Some(expected_return_date) = expected_return_date {
        if expected_return_date < loan_date {
            return Err(CreateLoanError::DueDateBeforeLoanDate {
                loan_date,
                expected_return_date,
            });
        }
    }

    Ok(NewLoan {
        loan_date,
        expected_return_date,
        borrower_id: cmd.borrower_id,
        stock_item_id: cmd.stock_item_id,
    })
}

/// 純粋関数：評価日時点のステータスを導出する
///
/// 優先順位：
/// 1. 実返却日あり → Returned
/// 2. 返却予定日あり、かつ評価日 > 返却予定日（日付のみで厳密比較） → Overdue
/// 3. それ以外 → Active
///
/// 返却予定日当日はまだ延滞ではない。
pub fn derive_status(loan: &Loan, as_of: NaiveDate) -> LoanStatus {
    if loan.actual_return_date.is_some() {
        return LoanStatus::Returned;
    }

    match loan.expected_return_date {
        Some(due) if as_of > due => LoanStatus::Overdue,
        _ => LoanStatus::Active,
    }
}

/// 当日を評価日としてステータスを導出する
pub fn derive_status_today(loan: &Loan) -> LoanStatus {
    derive_status(loan, super::today())
}

/// 純粋関数：延滞日数
///
/// Overdue以外は常に0。負にはならない。
pub fn days_overdue(loan: &Loan, as_of: NaiveDate) -> u32 {
    if !derive_status(loan, as_of).is_overdue() {
        return 0;
    }

    loan.expected_return_date
        .map(|due| days_between(due, as_of))
        .unwrap_or(0)
}

fn days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let days = (to - from).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// 返却処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnedLoan {
    /// 実返却日が設定された貸出
    pub loan: Loan,
    /// 返却予定日からの遅延日数（期限内なら0）
    pub days_late: u32,
}

/// 純粋関数：貸出を返却する
///
/// ビジネスルール：
/// - 既に返却済みの貸出は返却できない（何もせず成功扱いにはしない）
/// - 返却日は貸出日より前にできない
/// - 延滞していても返却は受け付ける
///
/// 副作用なし。元の貸出は変更せず、新しい貸出を返す。
pub fn return_loan(loan: &Loan, return_date: NaiveDate) -> Result<ReturnedLoan, ReturnLoanError> {
    if let Some(returned_on) = loan.actual_return_date {
        return Err(ReturnLoanError::AlreadyReturned(returned_on));
    }

    if return_date < loan.loan_date {
        return Err(ReturnLoanError::ReturnBeforeLoanDate {
            loan_date: loan.loan_date,
            return_date,
        });
    }

    let days_late = days_overdue(loan, return_date);

    Ok(ReturnedLoan {
        loan: Loan {
            actual_return_date: Some(return_date),
            ..loan.clone()
        },
        days_late,
    })
}

/// 表示層向けの貸出ビュー（永続化しない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub status: LoanStatus,
    pub days_overdue: u32,
}

impl LoanView {
    /// 評価日時点のステータスと延滞日数を付与する
    pub fn evaluate(loan: Loan, as_of: NaiveDate) -> Self {
        let status = derive_status(&loan, as_of);
        let days_overdue = days_overdue(&loan, as_of);
        Self {
            loan,
            status,
            days_overdue,
        }
    }
}
