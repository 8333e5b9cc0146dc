use crate::domain::{
    BorrowerId,
    penalty::{NewPenalty, Penalty},
};
use async_trait::async_trait;
use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ペナルティストアポート
///
/// 延滞返却時のペナルティ記録と、利用者の貸出停止判定に使用される。
#[async_trait]
pub trait PenaltyStore: Send + Sync {
    /// ペナルティを記録する
    async fn record(&self, penalty: NewPenalty) -> Result<Penalty>;

    /// 評価日時点で有効な利用者のペナルティを取得する
    async fn active_for_borrower(
        &self,
        borrower_id: BorrowerId,
        as_of: NaiveDate,
    ) -> Result<Vec<Penalty>>;
}
