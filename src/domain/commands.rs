use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BorrowerId, LoanId, StockItemId};

/// 返却予定日の指定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DueDate {
    /// 貸出日 + 既定の貸出期間
    Default,
    /// 明示的な日付
    On(NaiveDate),
    /// 返却期限を設けない
    None,
}

/// コマンド：貸出を作成する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub borrower_id: BorrowerId,
    pub stock_item_id: StockItemId,
    /// 省略時は当日
    pub loan_date: Option<NaiveDate>,
    pub due_date: DueDate,
}

/// コマンド：貸出を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    /// 省略時は当日
    pub return_date: Option<NaiveDate>,
}
