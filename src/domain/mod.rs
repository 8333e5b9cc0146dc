pub mod commands;
pub mod errors;
pub mod loan;
pub mod penalty;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;

/// 評価日の既定値（UTCの当日）
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
