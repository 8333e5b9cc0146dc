pub mod loan_repository;
pub mod penalty_store;

pub use loan_repository::LoanRepository;
pub use penalty_store::PenaltyStore;
