use crate::domain::{
    BorrowerId, LoanId, PenaltyId,
    penalty::{NewPenalty, Penalty},
};
use crate::ports::penalty_store::{PenaltyStore as PenaltyStoreTrait, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_penalty(row: &PgRow) -> Result<Penalty> {
    Ok(Penalty {
        id: PenaltyId::new(row.try_get("id")?),
        borrower_id: BorrowerId::new(row.try_get("borrower_id")?),
        loan_id: LoanId::new(row.try_get("loan_id")?),
        description: row.try_get("description")?,
        ends_on: row.try_get("ends_on")?,
    })
}

/// PenaltyStoreのPostgreSQL実装
pub struct PenaltyStore {
    pool: PgPool,
}

impl PenaltyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PenaltyStoreTrait for PenaltyStore {
    async fn record(&self, penalty: NewPenalty) -> Result<Penalty> {
        let row = sqlx::query(
            r#"
            INSERT INTO penalties (borrower_id, loan_id, description, ends_on)
            VALUES ($1, $2, $3, $4)
            RETURNING id, borrower_id, loan_id, description, ends_on
            "#,
        )
        .bind(penalty.borrower_id.value())
        .bind(penalty.loan_id.value())
        .bind(&penalty.description)
        .bind(penalty.ends_on)
        .fetch_one(&self.pool)
        .await?;

        map_row_to_penalty(&row)
    }

    /// (borrower_id, ends_on)のインデックスを利用する
    async fn active_for_borrower(
        &self,
        borrower_id: BorrowerId,
        as_of: NaiveDate,
    ) -> Result<Vec<Penalty>> {
        let rows = sqlx::query(
            r#"
            SELECT id, borrower_id, loan_id, description, ends_on
            FROM penalties
            WHERE borrower_id = $1 AND (ends_on IS NULL OR ends_on > $2)
            ORDER BY ends_on DESC NULLS FIRST
            "#,
        )
        .bind(borrower_id.value())
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_penalty).collect()
    }
}
