use crate::domain::{
    BorrowerId, LoanId, Page, Pagination, StockItemId,
    loan::{Loan, NewLoan},
};
use crate::ports::loan_repository::{
    LoanRepository as LoanRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

/// 在庫アイテムごとの未返却貸出を1件に制限する部分ユニークインデックス
const ONE_OPEN_LOAN_PER_ITEM: &str = "loans_one_open_loan_per_item";

const LOAN_COLUMNS: &str =
    "id, loan_date, expected_return_date, actual_return_date, borrower_id, stock_item_id";

/// sqlxのエラーをコラボレーターのエラーに変換する
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return RepositoryError::NotFound;
    }

    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(ONE_OPEN_LOAN_PER_ITEM) {
            return RepositoryError::ItemUnavailable;
        }
    }

    RepositoryError::Transport(Box::new(err))
}

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let read = || -> std::result::Result<Loan, sqlx::Error> {
        Ok(Loan {
            id: LoanId::new(row.try_get("id")?),
            loan_date: row.try_get("loan_date")?,
            expected_return_date: row.try_get("expected_return_date")?,
            actual_return_date: row.try_get("actual_return_date")?,
            borrower_id: BorrowerId::new(row.try_get("borrower_id")?),
            stock_item_id: StockItemId::new(row.try_get("stock_item_id")?),
        })
    };

    read().map_err(|e| RepositoryError::Transport(Box::new(e)))
}

/// LoanRepositoryのPostgreSQL実装
///
/// 返却は`actual_return_date IS NULL`を条件にした単一のUPDATEで行うため、
/// 同じ貸出への同時返却は1件だけが成功する。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_page(&self, only_open: bool, pagination: Pagination) -> Result<Page<Loan>> {
        let filter = if only_open {
            "WHERE actual_return_date IS NULL"
        } else {
            ""
        };

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM loans {filter}"))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOAN_COLUMNS}
            FROM loans
            {filter}
            ORDER BY loan_date DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(i64::from(pagination.size()))
        .bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Page {
            items: rows.iter().map(map_row_to_loan).collect::<Result<_>>()?,
            total: u64::try_from(total).unwrap_or(0),
            pagination,
        })
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// 貸出を作成
    ///
    /// 在庫アイテムの重複貸出は部分ユニークインデックス違反として検出する。
    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO loans (loan_date, expected_return_date, borrower_id, stock_item_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(new_loan.loan_date)
        .bind(new_loan.expected_return_date)
        .bind(new_loan.borrower_id.value())
        .bind(new_loan.stock_item_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        map_row_to_loan(&row)
    }

    /// 実返却日を設定
    ///
    /// 更新行がなければ、存在しないのか返却済みなのかを確認して区別する。
    async fn return_loan(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Loan> {
        let updated = sqlx::query(&format!(
            r#"
            UPDATE loans
            SET actual_return_date = $2
            WHERE id = $1 AND actual_return_date IS NULL
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(loan_id.value())
        .bind(return_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = updated {
            return map_row_to_loan(&row);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM loans WHERE id = $1")
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match exists {
            Some(_) => Err(RepositoryError::AlreadyReturned),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// IDで貸出を取得
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = $1"))
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// 未返却の貸出を取得
    ///
    /// 部分インデックス（actual_return_date IS NULL）を利用する。
    async fn list_active_loans(&self, pagination: Pagination) -> Result<Page<Loan>> {
        self.fetch_page(true, pagination).await
    }

    /// 全貸出の履歴を取得
    async fn list_loans(&self, pagination: Pagination) -> Result<Page<Loan>> {
        self.fetch_page(false, pagination).await
    }
}
