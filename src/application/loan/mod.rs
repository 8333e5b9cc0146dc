mod errors;
mod loan_service;
mod overdue_detection;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{
    ServiceDependencies, create_loan, get_loan, list_active_loans, list_loans, return_loan,
};
pub use overdue_detection::{LoanReport, list_overdue_loans, loan_report};
