use rust_decimal::Decimal;

use super::YearMonth;

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub period: YearMonth,
    /// Zero means no limit has been set for the month.
    pub amount: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

impl Budget {
    pub fn new(user_id: String, period: YearMonth, amount: Decimal) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            period,
            amount,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.amount <= Decimal::ZERO
    }
}
