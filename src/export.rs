use anyhow::{Context, Result};
use std::path::Path;

use crate::models::Expense;

const HEADER: [&str; 3] = ["date", "amount", "description"];

/// Write `expenses` as `date,amount,description` rows. Returns the row count.
pub(crate) fn write_expenses_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(HEADER)?;

    for expense in expenses {
        wtr.write_record([
            expense.date.format("%Y-%m-%d").to_string(),
            expense.amount.to_string(),
            expense.description.clone(),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(rows = expenses.len(), path = %path.display(), "Exported expenses");
    Ok(expenses.len())
}

/// Default export location for `period`, e.g. `~/kakeibo-2024-03.csv`.
pub(crate) fn default_path(period: crate::models::YearMonth) -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    format!("{home}/kakeibo-{period}.csv")
}

/// Expand a leading `~/` to `$HOME`.
pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
