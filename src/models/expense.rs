use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::YearMonth;

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// Store-assigned UUID.
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Expense {
    pub fn new(user_id: String, amount: Decimal, date: NaiveDate, description: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            amount,
            date,
            description,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn period(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}
