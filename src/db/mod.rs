mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

const EXPENSE_COLUMNS: &str =
    "id, user_id, amount, date, description, created_at, updated_at";
const BUDGET_COLUMNS: &str = "id, user_id, year, month, amount, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, password_hash, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            tracing::debug!(version = schema::CURRENT_VERSION, "Created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "Applying database migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(&self, user: &User) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.email, user.password_hash, user.created_at],
            )
            .with_context(|| format!("Failed to create user {}", user.email))?;
        Ok(())
    }

    pub(crate) fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email.trim().to_lowercase()],
            user_from_row,
        );
        optional(result)
    }

    // ── Sessions ──────────────────────────────────────────────

    pub(crate) fn insert_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                session.token,
                session.user.id,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub(crate) fn find_session_user(&self, token: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT u.id, u.email, u.password_hash, u.created_at
             FROM sessions s JOIN users u ON s.user_id = u.id
             WHERE s.token = ?1",
            params![token],
            user_from_row,
        );
        optional(result)
    }

    pub(crate) fn delete_session(&self, token: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    /// Expenses dated within `from..=to`, newest first.
    pub(crate) fn fetch_expenses(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC, created_at DESC"
        ))?;
        let rows = stmt.query_map(params![user_id, from, to], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn fetch_month_expenses(
        &self,
        user_id: &str,
        period: YearMonth,
    ) -> Result<Vec<Expense>> {
        self.fetch_expenses(user_id, period.first_day(), period.last_day())
    }

    pub(crate) fn get_expense(&self, user_id: &str, id: &str) -> Result<Option<Expense>> {
        let result = self.conn.query_row(
            &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id],
            expense_from_row,
        );
        optional(result)
    }

    pub(crate) fn insert_expense(
        &self,
        user_id: &str,
        amount: Decimal,
        date: NaiveDate,
        description: &str,
    ) -> Result<Expense> {
        let expense = Expense::new(user_id.to_string(), amount, date, description.to_string());
        self.conn.execute(
            &format!("INSERT INTO expenses ({EXPENSE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                expense.id,
                expense.user_id,
                expense.amount.to_string(),
                expense.date,
                expense.description,
                expense.created_at,
                expense.updated_at,
            ],
        )?;
        Ok(expense)
    }

    /// Returns the updated row, or `None` if no such expense belongs to the user.
    pub(crate) fn update_expense(
        &self,
        user_id: &str,
        id: &str,
        amount: Decimal,
        date: NaiveDate,
        description: &str,
    ) -> Result<Option<Expense>> {
        let changed = self.conn.execute(
            "UPDATE expenses SET amount = ?1, date = ?2, description = ?3, updated_at = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![
                amount.to_string(),
                date,
                description,
                chrono::Utc::now().to_rfc3339(),
                id,
                user_id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_expense(user_id, id)
    }

    /// Returns whether a row was removed.
    pub(crate) fn delete_expense(&self, user_id: &str, id: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM expenses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn expense_count(&self, user_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn fetch_budget(&self, user_id: &str, period: YearMonth) -> Result<Option<Budget>> {
        let result = self.conn.query_row(
            &format!(
                "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ?1 AND year = ?2 AND month = ?3"
            ),
            params![user_id, period.year(), period.month()],
            budget_from_row,
        );
        optional(result)
    }

    /// Create or replace the budget for (user, year, month).
    pub(crate) fn upsert_budget(
        &self,
        user_id: &str,
        period: YearMonth,
        amount: Decimal,
    ) -> Result<Budget> {
        let budget = Budget::new(user_id.to_string(), period, amount);
        self.conn.execute(
            &format!(
                "INSERT INTO budgets ({BUDGET_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id, year, month)
                 DO UPDATE SET amount = excluded.amount, updated_at = excluded.updated_at"
            ),
            params![
                budget.id,
                budget.user_id,
                period.year(),
                period.month(),
                budget.amount.to_string(),
                budget.created_at,
                budget.updated_at,
            ],
        )?;
        self.fetch_budget(user_id, period)?
            .with_context(|| format!("Budget for {period} missing after upsert"))
    }

    pub(crate) fn delete_budget(&self, user_id: &str, period: YearMonth) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM budgets WHERE user_id = ?1 AND year = ?2 AND month = ?3",
            params![user_id, period.year(), period.month()],
        )?;
        Ok(changed > 0)
    }
}

fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn expense_from_row(row: &Row) -> rusqlite::Result<Expense> {
    let amount_str: String = row.get(2)?;
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        date: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    let year: i32 = row.get(2)?;
    let month: u32 = row.get(3)?;
    let period = YearMonth::new(year, month).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            format!("invalid budget month {year}-{month}").into(),
        )
    })?;
    let amount_str: String = row.get(4)?;
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        period,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
