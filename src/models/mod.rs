mod budget;
mod expense;
mod period;
mod user;

pub use budget::Budget;
pub use expense::Expense;
pub use period::YearMonth;
pub use user::{Session, User};

#[cfg(test)]
mod tests;
