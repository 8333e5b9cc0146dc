use serde::{Deserialize, Serialize};

/// 貸出ID - 永続化側で採番される不変の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(i64);

impl LoanId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 利用者ID - 利用者管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BorrowerId(i64);

impl BorrowerId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 在庫アイテムID - 蔵書（1冊単位）への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockItemId(i64);

impl StockItemId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// ペナルティID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PenaltyId(i64);

impl PenaltyId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 1ページあたりの最大件数
pub const MAX_PAGE_SIZE: u32 = 100;

/// ページネーションのエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    PageOutOfRange,
    #[error("size must be between 1 and {MAX_PAGE_SIZE}")]
    SizeOutOfRange,
}

/// ページネーション
///
/// 不変条件：page >= 1 かつ 1 <= size <= 100
/// 生成時に検証し、不正な値を持つインスタンスを作らせない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    size: u32,
}

impl Pagination {
    pub fn new(page: u32, size: u32) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::PageOutOfRange);
        }
        if size < 1 || size > MAX_PAGE_SIZE {
            return Err(PaginationError::SizeOutOfRange);
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// 先頭から読み飛ばす件数
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    /// 次のページ
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// ページ単位の検索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// 要素を変換した同じページを返す
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pagination: self.pagination,
        }
    }

    /// 後続ページが存在するか
    pub fn has_more(&self) -> bool {
        self.pagination.offset() + (self.items.len() as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_default_is_first_page_of_ten() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.size(), 10);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_pagination_offset() {
        let pagination = Pagination::new(3, 20).unwrap();
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.next().offset(), 60);
    }

    #[test]
    fn test_pagination_rejects_page_zero() {
        assert_eq!(Pagination::new(0, 10), Err(PaginationError::PageOutOfRange));
    }

    #[test]
    fn test_pagination_rejects_size_out_of_range() {
        assert_eq!(Pagination::new(1, 0), Err(PaginationError::SizeOutOfRange));
        assert_eq!(
            Pagination::new(1, MAX_PAGE_SIZE + 1),
            Err(PaginationError::SizeOutOfRange)
        );
        assert!(Pagination::new(1, MAX_PAGE_SIZE).is_ok());
    }

    #[test]
    fn test_page_has_more() {
        let page = Page {
            items: vec![1, 2],
            total: 5,
            pagination: Pagination::new(1, 2).unwrap(),
        };
        assert!(page.has_more());

        let last = Page {
            items: vec![5],
            total: 5,
            pagination: Pagination::new(3, 2).unwrap(),
        };
        assert!(!last.has_more());
    }

    #[test]
    fn test_loan_id_display() {
        assert_eq!(LoanId::new(42).to_string(), "42");
    }
}
