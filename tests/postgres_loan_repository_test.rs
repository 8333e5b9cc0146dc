//! PostgreSQLアダプターのテスト
//!
//! 実際のデータベースが必要なため通常は無視される。
//! `DATABASE_URL=... cargo test -- --ignored` で実行する。

mod common;

use common::date;
use library_loans::adapters::postgres::{PostgresLoanRepository, PostgresPenaltyStore};
use library_loans::domain::loan::NewLoan;
use library_loans::domain::penalty::NewPenalty;
use library_loans::domain::{BorrowerId, LoanId, Pagination, StockItemId};
use library_loans::ports::{LoanRepository, PenaltyStore, RepositoryError};
use sqlx::PgPool;

/// テストデータをクリーンアップ
async fn cleanup_database(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE penalties, loans RESTART IDENTITY CASCADE")
        .execute(pool)
        .await
        .expect("Failed to truncate tables");
}

fn new_loan(stock_item: i64) -> NewLoan {
    NewLoan {
        loan_date: date(2024, 1, 10),
        expected_return_date: Some(date(2024, 1, 17)),
        borrower_id: BorrowerId::new(1),
        stock_item_id: StockItemId::new(stock_item),
    }
}

// テーブルを共有するため、1つのテスト関数で順に実行する
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_loan_repository_lifecycle() {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;
    let repo = PostgresLoanRepository::new(pool.clone());

    // 作成
    let loan = repo.create_loan(new_loan(10)).await.unwrap();
    assert_eq!(loan.loan_date, date(2024, 1, 10));
    assert_eq!(loan.expected_return_date, Some(date(2024, 1, 17)));
    assert_eq!(loan.actual_return_date, None);

    // 貸出中の在庫アイテムは貸出不可
    let result = repo.create_loan(new_loan(10)).await;
    assert!(matches!(result, Err(RepositoryError::ItemUnavailable)));

    // 返却
    let returned = repo.return_loan(loan.id, date(2024, 1, 16)).await.unwrap();
    assert_eq!(returned.actual_return_date, Some(date(2024, 1, 16)));

    // 2回目の返却は拒否され、実返却日は変わらない
    let result = repo.return_loan(loan.id, date(2024, 1, 18)).await;
    assert!(matches!(result, Err(RepositoryError::AlreadyReturned)));
    let stored = repo.get_by_id(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.actual_return_date, Some(date(2024, 1, 16)));

    // 存在しない貸出
    let result = repo.return_loan(LoanId::new(i64::MAX), date(2024, 1, 18)).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));

    // 返却後は同じ在庫アイテムを再度貸出可能
    let again = repo.create_loan(new_loan(10)).await.unwrap();

    let active = repo.list_active_loans(Pagination::default()).await.unwrap();
    assert_eq!(active.total, 1);
    assert_eq!(active.items[0].id, again.id);

    let all = repo.list_loans(Pagination::default()).await.unwrap();
    assert_eq!(all.total, 2);

    check_penalty_store(&pool, again.id).await;
}

async fn check_penalty_store(pool: &PgPool, loan_id: LoanId) {
    let store = PostgresPenaltyStore::new(pool.clone());

    let penalty = store
        .record(NewPenalty {
            borrower_id: BorrowerId::new(1),
            loan_id,
            description: "Returned 3 day(s) late".to_string(),
            ends_on: Some(date(2024, 1, 23)),
        })
        .await
        .unwrap();
    assert_eq!(penalty.ends_on, Some(date(2024, 1, 23)));

    let active = store
        .active_for_borrower(BorrowerId::new(1), date(2024, 1, 22))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    let expired = store
        .active_for_borrower(BorrowerId::new(1), date(2024, 1, 23))
        .await
        .unwrap();
    assert!(expired.is_empty());

    // 無期限のペナルティは常に有効
    store
        .record(NewPenalty {
            borrower_id: BorrowerId::new(1),
            loan_id,
            description: "Suspended indefinitely".to_string(),
            ends_on: None,
        })
        .await
        .unwrap();
    let open_ended = store
        .active_for_borrower(BorrowerId::new(1), date(2030, 1, 1))
        .await
        .unwrap();
    assert_eq!(open_ended.len(), 1);
    assert_eq!(open_ended[0].ends_on, None);
}
