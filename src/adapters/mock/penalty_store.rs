use crate::domain::{
    BorrowerId, PenaltyId,
    penalty::{NewPenalty, Penalty},
};
use crate::ports::penalty_store::{PenaltyStore as PenaltyStoreTrait, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory implementation of PenaltyStore
///
/// Keeps every recorded penalty so tests can inspect them.
pub struct PenaltyStore {
    penalties: Mutex<Vec<Penalty>>,
    fail_next_record: AtomicBool,
}

impl PenaltyStore {
    pub fn new() -> Self {
        Self {
            penalties: Mutex::new(Vec::new()),
            fail_next_record: AtomicBool::new(false),
        }
    }

    /// Make the next record call fail
    pub fn fail_next_record(&self) {
        self.fail_next_record.store(true, Ordering::SeqCst);
    }

    /// All penalties recorded so far
    pub fn recorded(&self) -> Result<Vec<Penalty>> {
        Ok(self.penalties.lock().map_err(|e| e.to_string())?.clone())
    }
}

impl Default for PenaltyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PenaltyStoreTrait for PenaltyStore {
    async fn record(&self, penalty: NewPenalty) -> Result<Penalty> {
        if self.fail_next_record.swap(false, Ordering::SeqCst) {
            return Err("injected penalty store failure".into());
        }
        let mut penalties = self.penalties.lock().map_err(|e| e.to_string())?;
        let recorded = Penalty {
            id: PenaltyId::new(penalties.len() as i64 + 1),
            borrower_id: penalty.borrower_id,
            loan_id: penalty.loan_id,
            description: penalty.description,
            ends_on: penalty.ends_on,
        };
        penalties.push(recorded.clone());
        Ok(recorded)
    }

    async fn active_for_borrower(
        &self,
        borrower_id: BorrowerId,
        as_of: NaiveDate,
    ) -> Result<Vec<Penalty>> {
        let penalties = self.penalties.lock().map_err(|e| e.to_string())?;
        Ok(penalties
            .iter()
            .filter(|p| p.borrower_id == borrower_id && p.is_active(as_of))
            .cloned()
            .collect())
    }
}
