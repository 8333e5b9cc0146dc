use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{BorrowerId, LoanId, PenaltyId, loan::ReturnedLoan};

/// 延滞返却によるペナルティ
///
/// 期間は遅延日数と同じ。ends_onより前の日は貸出停止となる。
/// ends_onがNoneのペナルティは無期限。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub id: PenaltyId,
    pub borrower_id: BorrowerId,
    pub loan_id: LoanId,
    pub description: String,
    pub ends_on: Option<NaiveDate>,
}

/// 永続化前のペナルティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPenalty {
    pub borrower_id: BorrowerId,
    pub loan_id: LoanId,
    pub description: String,
    pub ends_on: Option<NaiveDate>,
}

impl Penalty {
    /// 評価日時点で有効か
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.ends_on.is_none_or(|ends_on| ends_on > as_of)
    }
}

/// 純粋関数：返却結果から延滞ペナルティを算出する
///
/// 期限内の返却、または返却期限なしの貸出ではNone。
/// 終了日が日付の表現範囲を超える場合は無期限とする。
pub fn late_penalty(returned: &ReturnedLoan) -> Option<NewPenalty> {
    if returned.days_late == 0 {
        return None;
    }

    let return_date = returned.loan.actual_return_date?;

    Some(NewPenalty {
        borrower_id: returned.loan.borrower_id,
        loan_id: returned.loan.id,
        description: format!("Returned {} day(s) late", returned.days_late),
        ends_on: return_date.checked_add_signed(Duration::days(i64::from(returned.days_late))),
    })
}

/// 純粋関数：評価日時点で利用者が貸出停止中か
pub fn is_suspended(penalties: &[Penalty], as_of: NaiveDate) -> bool {
    penalties.iter().any(|p| p.is_active(as_of))
}

/// 純粋関数：有効なペナルティのうち最も遅い終了日
///
/// 停止中でなければ`None`、無期限のペナルティがあれば`Some(None)`。
pub fn suspended_until(penalties: &[Penalty], as_of: NaiveDate) -> Option<Option<NaiveDate>> {
    let active: Vec<&Penalty> = penalties.iter().filter(|p| p.is_active(as_of)).collect();
    if active.is_empty() {
        return None;
    }
    if active.iter().any(|p| p.ends_on.is_none()) {
        return Some(None);
    }
    Some(active.iter().filter_map(|p| p.ends_on).max())
}
