use crate::domain::{
    BorrowerId, LoanId, Page, Pagination, StockItemId,
    loan::{Loan, NewLoan},
};
use crate::ports::loan_repository::{
    LoanRepository as LoanRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    loans: BTreeMap<LoanId, Loan>,
    next_id: i64,
    borrowers: HashSet<BorrowerId>,
    stock_items: HashSet<StockItemId>,
}

/// In-memory implementation of LoanRepository
///
/// Serves tests and the binary when no database is configured.
/// The check-and-set of a return happens under a single lock, so only one of
/// several concurrent returns of the same loan succeeds.
pub struct LoanRepository {
    state: Mutex<State>,
    strict_references: bool,
    fail_next: AtomicBool,
    fail_next_return: AtomicBool,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            strict_references: false,
            fail_next: AtomicBool::new(false),
            fail_next_return: AtomicBool::new(false),
        }
    }

    /// Reject loans for borrowers and stock items that were not registered
    pub fn with_known_references_only(mut self) -> Self {
        self.strict_references = true;
        self
    }

    /// Register a borrower for strict mode
    pub fn add_borrower(&self, borrower_id: BorrowerId) -> Result<()> {
        self.lock()?.borrowers.insert(borrower_id);
        Ok(())
    }

    /// Register a stock item for strict mode
    pub fn add_stock_item(&self, stock_item_id: StockItemId) -> Result<()> {
        self.lock()?.stock_items.insert(stock_item_id);
        Ok(())
    }

    /// Store a loan as-is, keeping its id (test fixtures)
    pub fn insert(&self, loan: Loan) -> Result<()> {
        let mut state = self.lock()?;
        state.next_id = state.next_id.max(loan.id.value() + 1);
        state.loans.insert(loan.id, loan);
        Ok(())
    }

    /// Make the next call fail with a transport error
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Make the next return_loan call fail with a transport error
    pub fn fail_next_return(&self) {
        self.fail_next_return.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::Transport(e.to_string().into()))
    }

    fn check_transport(&self) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Transport(
                "injected transport failure".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LoanRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<'a>(loans: impl Iterator<Item = &'a Loan>, pagination: Pagination) -> Page<Loan> {
    let mut sorted: Vec<&Loan> = loans.collect();
    sorted.sort_by(|a, b| b.loan_date.cmp(&a.loan_date).then(b.id.cmp(&a.id)));

    let total = sorted.len() as u64;
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let items = sorted
        .into_iter()
        .skip(offset)
        .take(pagination.size() as usize)
        .cloned()
        .collect();

    Page {
        items,
        total,
        pagination,
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        self.check_transport()?;
        let mut state = self.lock()?;

        if self.strict_references
            && (!state.borrowers.contains(&new_loan.borrower_id)
                || !state.stock_items.contains(&new_loan.stock_item_id))
        {
            return Err(RepositoryError::NotFound);
        }

        let on_loan = state.loans.values().any(|loan| {
            loan.stock_item_id == new_loan.stock_item_id && loan.actual_return_date.is_none()
        });
        if on_loan {
            return Err(RepositoryError::ItemUnavailable);
        }

        let id = LoanId::new(state.next_id);
        state.next_id += 1;

        let loan = Loan {
            id,
            loan_date: new_loan.loan_date,
            expected_return_date: new_loan.expected_return_date,
            actual_return_date: None,
            borrower_id: new_loan.borrower_id,
            stock_item_id: new_loan.stock_item_id,
        };
        state.loans.insert(id, loan.clone());

        Ok(loan)
    }

    async fn return_loan(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Loan> {
        self.check_transport()?;
        if self.fail_next_return.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Transport("injected return failure".into()));
        }
        let mut state = self.lock()?;

        let loan = state
            .loans
            .get_mut(&loan_id)
            .ok_or(RepositoryError::NotFound)?;

        if loan.actual_return_date.is_some() {
            return Err(RepositoryError::AlreadyReturned);
        }

        loan.actual_return_date = Some(return_date);
        Ok(loan.clone())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        self.check_transport()?;
        Ok(self.lock()?.loans.get(&loan_id).cloned())
    }

    async fn list_active_loans(&self, pagination: Pagination) -> Result<Page<Loan>> {
        self.check_transport()?;
        let state = self.lock()?;
        Ok(paginate(
            state
                .loans
                .values()
                .filter(|loan| loan.actual_return_date.is_none()),
            pagination,
        ))
    }

    async fn list_loans(&self, pagination: Pagination) -> Result<Page<Loan>> {
        self.check_transport()?;
        let state = self.lock()?;
        Ok(paginate(state.loans.values(), pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_loan(stock_item: i64, loan_date: NaiveDate) -> NewLoan {
        NewLoan {
            loan_date,
            expected_return_date: Some(loan_date + chrono::Duration::days(14)),
            borrower_id: BorrowerId::new(1),
            stock_item_id: StockItemId::new(stock_item),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = LoanRepository::new();

        let first = repo.create_loan(new_loan(1, date(2024, 1, 1))).await.unwrap();
        let second = repo.create_loan(new_loan(2, date(2024, 1, 2))).await.unwrap();

        assert_eq!(first.id, LoanId::new(1));
        assert_eq!(second.id, LoanId::new(2));
    }

    #[tokio::test]
    async fn test_create_rejects_item_on_loan() {
        let repo = LoanRepository::new();
        repo.create_loan(new_loan(1, date(2024, 1, 1))).await.unwrap();

        let result = repo.create_loan(new_loan(1, date(2024, 1, 2))).await;

        assert!(matches!(result, Err(RepositoryError::ItemUnavailable)));
    }

    #[tokio::test]
    async fn test_item_can_be_loaned_again_after_return() {
        let repo = LoanRepository::new();
        let loan = repo.create_loan(new_loan(1, date(2024, 1, 1))).await.unwrap();
        repo.return_loan(loan.id, date(2024, 1, 5)).await.unwrap();

        let result = repo.create_loan(new_loan(1, date(2024, 1, 6))).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_unknown_references() {
        let repo = LoanRepository::new().with_known_references_only();
        repo.add_borrower(BorrowerId::new(1)).unwrap();

        let result = repo.create_loan(new_loan(1, date(2024, 1, 1))).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));

        repo.add_stock_item(StockItemId::new(1)).unwrap();
        let result = repo.create_loan(new_loan(1, date(2024, 1, 1))).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_second_return_is_rejected() {
        let repo = LoanRepository::new();
        let loan = repo.create_loan(new_loan(1, date(2024, 1, 1))).await.unwrap();
        repo.return_loan(loan.id, date(2024, 1, 5)).await.unwrap();

        let result = repo.return_loan(loan.id, date(2024, 1, 9)).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyReturned)));
        let stored = repo.get_by_id(loan.id).await.unwrap().unwrap();
        assert_eq!(stored.actual_return_date, Some(date(2024, 1, 5)));
    }

    #[tokio::test]
    async fn test_return_unknown_loan_is_not_found() {
        let repo = LoanRepository::new();

        let result = repo.return_loan(LoanId::new(404), date(2024, 1, 5)).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_active_excludes_returned_and_pages_newest_first() {
        let repo = LoanRepository::new();
        for day in 1..=5 {
            repo.create_loan(new_loan(i64::from(day), date(2024, 1, day)))
                .await
                .unwrap();
        }
        repo.return_loan(LoanId::new(5), date(2024, 1, 6)).await.unwrap();

        let page = repo
            .list_active_loans(Pagination::new(1, 3).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total, 4);
        let ids: Vec<i64> = page.items.iter().map(|l| l.id.value()).collect();
        assert_eq!(ids, vec![4, 3, 2]);

        let next = repo.list_active_loans(page.pagination.next()).await.unwrap();
        let ids: Vec<i64> = next.items.iter().map(|l| l.id.value()).collect();
        assert_eq!(ids, vec![1]);
        assert!(!next.has_more());

        let all = repo.list_loans(Pagination::default()).await.unwrap();
        assert_eq!(all.total, 5);
    }

    #[tokio::test]
    async fn test_injected_failure_affects_one_call() {
        let repo = LoanRepository::new();
        repo.fail_next_call();

        let result = repo.list_loans(Pagination::default()).await;
        assert!(matches!(result, Err(RepositoryError::Transport(_))));

        let result = repo.list_loans(Pagination::default()).await;
        assert!(result.is_ok());
    }
}
