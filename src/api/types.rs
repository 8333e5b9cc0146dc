use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::loan::LoanApplicationError;
use crate::domain::{
    BorrowerId, Page, Pagination, StockItemId,
    commands::{CreateLoan, DueDate},
    loan::LoanView,
};

/// 貸出作成リクエスト（POST /loans）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub borrower_id: i64,
    pub stock_item_id: i64,
    /// 省略時は当日
    pub loan_date: Option<NaiveDate>,
    /// 省略時は貸出日 + 14日
    pub expected_return_date: Option<NaiveDate>,
    /// trueの場合は返却期限を設けない
    #[serde(default)]
    pub no_due_date: bool,
}

impl CreateLoanRequest {
    pub fn to_command(&self) -> Result<CreateLoan, LoanApplicationError> {
        let due_date = match (self.no_due_date, self.expected_return_date) {
            (true, Some(_)) => {
                return Err(LoanApplicationError::InvalidDates(
                    "expectedReturnDate cannot be combined with noDueDate".to_string(),
                ));
            }
            (true, None) => DueDate::None,
            (false, Some(date)) => DueDate::On(date),
            (false, None) => DueDate::Default,
        };

        Ok(CreateLoan {
            borrower_id: BorrowerId::new(self.borrower_id),
            stock_item_id: StockItemId::new(self.stock_item_id),
            loan_date: self.loan_date,
            due_date,
        })
    }
}

/// 返却リクエスト（POST /loans/:id/return）
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLoanRequest {
    /// 省略時は当日
    pub return_date: Option<NaiveDate>,
}

impl ReturnLoanRequest {
    /// リクエストボディを解釈する
    ///
    /// 空（空白のみを含む）のボディは省略として扱う。
    /// それ以外で解釈できないボディは返却日を当日に読み替えず、`InvalidDates`として拒否する。
    pub fn from_body(body: &[u8]) -> Result<Self, LoanApplicationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| LoanApplicationError::InvalidDates(format!("invalid return request: {e}")))
    }
}

/// 評価日を指定するクエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationQuery {
    /// 省略時は当日
    pub as_of: Option<NaiveDate>,
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLoansQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// 未返却の貸出のみ
    #[serde(default)]
    pub active_only: bool,
    pub as_of: Option<NaiveDate>,
}

impl ListLoansQuery {
    pub fn pagination(&self) -> Result<Pagination, LoanApplicationError> {
        let default = Pagination::default();
        Pagination::new(
            self.page.unwrap_or(default.page()),
            self.size.unwrap_or(default.size()),
        )
        .map_err(|e| LoanApplicationError::InvalidPagination(e.to_string()))
    }
}

/// 貸出一覧レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPageResponse {
    pub data: Vec<LoanView>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl From<Page<LoanView>> for LoanPageResponse {
    fn from(page: Page<LoanView>) -> Self {
        Self {
            data: page.items,
            total: page.total,
            page: page.pagination.page(),
            size: page.pagination.size(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(expected: Option<NaiveDate>, no_due_date: bool) -> CreateLoanRequest {
        CreateLoanRequest {
            borrower_id: 1,
            stock_item_id: 2,
            loan_date: None,
            expected_return_date: expected,
            no_due_date,
        }
    }

    #[test]
    fn test_create_request_due_date_variants() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();

        assert_eq!(request(None, false).to_command().unwrap().due_date, DueDate::Default);
        assert_eq!(request(Some(date), false).to_command().unwrap().due_date, DueDate::On(date));
        assert_eq!(request(None, true).to_command().unwrap().due_date, DueDate::None);
        assert!(matches!(
            request(Some(date), true).to_command(),
            Err(LoanApplicationError::InvalidDates(_))
        ));
    }

    #[test]
    fn test_return_request_from_body() {
        assert_eq!(ReturnLoanRequest::from_body(b"").unwrap().return_date, None);
        assert_eq!(ReturnLoanRequest::from_body(b" \n").unwrap().return_date, None);
        assert_eq!(ReturnLoanRequest::from_body(b"{}").unwrap().return_date, None);
        assert_eq!(
            ReturnLoanRequest::from_body(br#"{"returnDate":"2024-01-16"}"#)
                .unwrap()
                .return_date,
            NaiveDate::from_ymd_opt(2024, 1, 16)
        );
    }

    #[test]
    fn test_return_request_rejects_unreadable_body() {
        for body in [
            br#"{"returnDate":"2024-01-32"}"#.as_slice(),
            br#"{"returnDate":"#.as_slice(),
            b"not json".as_slice(),
        ] {
            assert!(matches!(
                ReturnLoanRequest::from_body(body),
                Err(LoanApplicationError::InvalidDates(_))
            ));
        }
    }

    #[test]
    fn test_create_request_parses_camel_case() {
        let req: CreateLoanRequest = serde_json::from_str(
            r#"{"borrowerId": 3, "stockItemId": 4, "loanDate": "2024-01-10"}"#,
        )
        .unwrap();

        assert_eq!(req.borrower_id, 3);
        assert_eq!(req.stock_item_id, 4);
        assert_eq!(req.loan_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert!(!req.no_due_date);
    }

    #[test]
    fn test_list_query_pagination_defaults_and_validation() {
        let query = ListLoansQuery::default();
        assert_eq!(query.pagination().unwrap(), Pagination::default());

        let query = ListLoansQuery {
            size: Some(500),
            ..ListLoansQuery::default()
        };
        assert!(matches!(
            query.pagination(),
            Err(LoanApplicationError::InvalidPagination(_))
        ));
    }
}
