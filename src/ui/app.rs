use anyhow::Result;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use super::forms::{BudgetForm, ExpenseForm, ExpenseInput, LoginForm};
use super::util::format_amount;
use crate::auth::{AuthContext, AuthError};
use crate::config::{Config, Currency};
use crate::db::Database;
use crate::ledger::{self, MonthlyReport, MonthlySummary, PaceReport};
use crate::models::{Budget, Expense, YearMonth};

/// Shown when a store call fails. Details go to the log.
pub(crate) const STORE_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Report,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Home, Self::Report]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Report => write!(f, "Report"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    ExpenseForm,
    BudgetForm,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::ExpenseForm => write!(f, "EXPENSE"),
            Self::BudgetForm => write!(f, "BUDGET"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteExpense { id: String, label: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) auth: AuthContext,
    pub(crate) login: LoginForm,

    pub(crate) currency: Currency,
    pub(crate) trend_months: usize,
    pub(crate) today: NaiveDate,
    pub(crate) period: YearMonth,

    // Home
    pub(crate) expenses: Vec<Expense>,
    pub(crate) budget: Option<Budget>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Report
    pub(crate) report: Option<MonthlyReport>,

    // Forms
    pub(crate) expense_form: Option<ExpenseForm>,
    pub(crate) budget_form: Option<BudgetForm>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(auth: AuthContext, config: &Config) -> Self {
        let today = Local::now().date_naive();

        Self {
            running: true,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            auth,
            login: LoginForm::new(),

            currency: config.currency().clone(),
            trend_months: config.trend_months(),
            today,
            period: YearMonth::from_date(today),

            expenses: Vec::new(),
            budget: None,
            expense_index: 0,
            expense_scroll: 0,

            report: None,

            expense_form: None,
            budget_form: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    pub(crate) fn is_signed_in(&self) -> bool {
        self.auth.user().is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.auth.user().map(|u| u.id.clone())
    }

    pub(crate) fn money(&self, amount: Decimal) -> String {
        format_amount(amount, &self.currency)
    }

    /// Pick up a date change while the TUI is left open.
    pub(crate) fn tick_clock(&mut self) {
        self.today = Local::now().date_naive();
    }

    // ── Derived state ─────────────────────────────────────────

    pub(crate) fn budget_amount(&self) -> Decimal {
        self.budget.as_ref().map_or(Decimal::ZERO, |b| b.amount)
    }

    pub(crate) fn summary(&self) -> MonthlySummary {
        MonthlySummary::for_month(&self.expenses, self.period, self.budget_amount())
    }

    pub(crate) fn pace(&self) -> Option<PaceReport> {
        let summary = self.summary();
        ledger::pacing(
            self.period,
            summary.total_spent,
            summary.budget_amount,
            self.today,
        )
    }

    pub(crate) fn is_current_month(&self) -> bool {
        self.period.contains(self.today)
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    /// Id of the expense open in the edit form, if any.
    pub(crate) fn editing_id(&self) -> Option<&str> {
        self.expense_form
            .as_ref()
            .and_then(|f| f.editing_id.as_deref())
    }

    // ── Loading ───────────────────────────────────────────────

    fn load_month(
        &self,
        db: &Database,
        user_id: &str,
        period: YearMonth,
    ) -> Result<(Vec<Expense>, Option<Budget>)> {
        let expenses = db.fetch_month_expenses(user_id, period)?;
        let budget = db.fetch_budget(user_id, period)?;
        Ok((expenses, budget))
    }

    fn load_report(&self, db: &Database, user_id: &str, period: YearMonth) -> Result<MonthlyReport> {
        let from = MonthlyReport::window_start(period, self.trend_months);
        let rows = db.fetch_expenses(user_id, from, period.last_day())?;
        Ok(MonthlyReport::build(&rows, period, self.trend_months))
    }

    /// Switch to `period` and load its data. On failure the previous month
    /// stays on screen.
    pub(crate) fn set_period(&mut self, db: &Database, period: YearMonth) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        let loaded = self.load_month(db, &user_id, period).and_then(|month| {
            let report = self.load_report(db, &user_id, period)?;
            Ok((month, report))
        });

        match loaded {
            Ok(((expenses, budget), report)) => {
                if period != self.period {
                    self.expense_index = 0;
                    self.expense_scroll = 0;
                }
                self.period = period;
                self.expenses = expenses;
                self.budget = budget;
                self.report = Some(report);
                self.clamp_selection();
                true
            }
            Err(e) => {
                tracing::error!(%period, "Failed to load month: {e:#}");
                self.set_status(STORE_FAILURE);
                false
            }
        }
    }

    pub(crate) fn reload(&mut self, db: &Database) -> bool {
        self.set_period(db, self.period)
    }

    pub(crate) fn shift_period(&mut self, db: &Database, delta: i32) {
        let Some(period) = self.period.shift(delta) else {
            return;
        };
        if self.set_period(db, period) {
            self.set_status(format!("Month: {}", period.label()));
        }
    }

    pub(crate) fn go_to_today(&mut self, db: &Database) {
        let period = YearMonth::from_date(self.today);
        if self.set_period(db, period) {
            self.set_status(format!("Month: {}", period.label()));
        }
    }

    /// Recompute the report after a change to the month's expenses.
    fn refresh_report(&mut self, db: &Database) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        match self.load_report(db, &user_id, self.period) {
            Ok(report) => self.report = Some(report),
            Err(e) => tracing::error!(period = %self.period, "Failed to rebuild report: {e:#}"),
        }
    }

    /// Same order the store returns: date descending, then creation descending.
    fn sort_expenses(&mut self) {
        self.expenses.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
    }

    fn select_expense(&mut self, id: &str) {
        if let Some(index) = self.expenses.iter().position(|e| e.id == id) {
            self.expense_index = index;
            if index < self.expense_scroll {
                self.expense_scroll = index;
            } else if index >= self.expense_scroll + self.visible_rows.max(1) {
                self.expense_scroll = index + 1 - self.visible_rows.max(1);
            }
        }
    }

    fn clamp_selection(&mut self) {
        if self.expense_index >= self.expenses.len() {
            self.expense_index = self.expenses.len().saturating_sub(1);
        }
        if self.expense_scroll > self.expense_index {
            self.expense_scroll = self.expense_index;
        }
    }

    // ── Expense mutations ─────────────────────────────────────

    pub(crate) fn add_expense(&mut self, db: &Database, input: &ExpenseInput) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        match db.insert_expense(&user_id, input.amount, input.date, &input.description) {
            Ok(expense) => {
                tracing::info!(id = %expense.id, date = %expense.date, "Added expense");
                self.set_status(format!(
                    "Added {} on {}",
                    self.money(expense.amount),
                    expense.date
                ));
                if self.period.contains(expense.date) {
                    let id = expense.id.clone();
                    self.expenses.push(expense);
                    self.sort_expenses();
                    self.select_expense(&id);
                }
                self.refresh_report(db);
                true
            }
            Err(e) => {
                tracing::error!("Failed to add expense: {e:#}");
                self.set_status(STORE_FAILURE);
                false
            }
        }
    }

    pub(crate) fn update_expense(&mut self, db: &Database, id: &str, input: &ExpenseInput) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        match db.update_expense(&user_id, id, input.amount, input.date, &input.description) {
            Ok(Some(updated)) => {
                tracing::info!(id = %updated.id, "Updated expense");
                self.set_status(format!("Updated expense on {}", updated.date));
                if self.period.contains(updated.date) {
                    let id = updated.id.clone();
                    if let Some(slot) = self.expenses.iter_mut().find(|e| e.id == id) {
                        *slot = updated;
                    }
                    self.sort_expenses();
                    self.select_expense(&id);
                } else {
                    self.expenses.retain(|e| e.id != updated.id);
                    self.clamp_selection();
                }
                self.refresh_report(db);
                true
            }
            Ok(None) => {
                tracing::warn!(id, "Expense to update no longer exists");
                self.expenses.retain(|e| e.id != id);
                self.clamp_selection();
                self.set_status("That expense no longer exists");
                true
            }
            Err(e) => {
                tracing::error!(id, "Failed to update expense: {e:#}");
                self.set_status(STORE_FAILURE);
                false
            }
        }
    }

    pub(crate) fn delete_expense(&mut self, db: &Database, id: &str) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        match db.delete_expense(&user_id, id) {
            Ok(removed) => {
                if removed {
                    tracing::info!(id, "Deleted expense");
                    self.set_status("Expense deleted");
                } else {
                    self.set_status("That expense no longer exists");
                }
                self.expenses.retain(|e| e.id != id);
                self.clamp_selection();
                self.refresh_report(db);
                true
            }
            Err(e) => {
                tracing::error!(id, "Failed to delete expense: {e:#}");
                self.set_status(STORE_FAILURE);
                false
            }
        }
    }

    // ── Budget mutations ──────────────────────────────────────

    pub(crate) fn set_budget(&mut self, db: &Database, period: YearMonth, amount: Decimal) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        match db.upsert_budget(&user_id, period, amount) {
            Ok(budget) => {
                tracing::info!(%period, amount = %budget.amount, "Saved budget");
                self.set_status(if budget.is_unlimited() {
                    format!("No budget limit for {}", period.label())
                } else {
                    format!("Budget for {}: {}", period.label(), self.money(budget.amount))
                });
                if budget.period == self.period {
                    self.budget = Some(budget);
                }
                true
            }
            Err(e) => {
                tracing::error!(%period, "Failed to save budget: {e:#}");
                self.set_status(STORE_FAILURE);
                false
            }
        }
    }

    pub(crate) fn clear_budget(&mut self, db: &Database) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        match db.delete_budget(&user_id, self.period) {
            Ok(_) => {
                self.budget = None;
                self.set_status(format!("Cleared budget for {}", self.period.label()));
                true
            }
            Err(e) => {
                tracing::error!(period = %self.period, "Failed to clear budget: {e:#}");
                self.set_status(STORE_FAILURE);
                false
            }
        }
    }

    // ── Forms ─────────────────────────────────────────────────

    pub(crate) fn open_add_form(&mut self) {
        let default_date = if self.is_current_month() {
            self.today
        } else {
            self.period.first_day()
        };
        self.expense_form = Some(ExpenseForm::new(default_date));
        self.input_mode = InputMode::ExpenseForm;
    }

    pub(crate) fn open_edit_form(&mut self) {
        match self.selected_expense() {
            Some(expense) => {
                self.expense_form = Some(ExpenseForm::edit(expense));
                self.input_mode = InputMode::ExpenseForm;
            }
            None => self.set_status("No expense selected"),
        }
    }

    pub(crate) fn open_budget_form(&mut self) {
        self.budget_form = Some(BudgetForm::new(self.period, self.budget_amount()));
        self.input_mode = InputMode::BudgetForm;
    }

    pub(crate) fn close_forms(&mut self) {
        self.expense_form = None;
        self.budget_form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Validation errors keep the form open and never reach the store.
    pub(crate) fn submit_expense_form(&mut self, db: &Database) {
        let Some(form) = self.expense_form.as_ref() else {
            return;
        };
        let editing_id = form.editing_id.clone();
        let input = match form.validate() {
            Ok(input) => input,
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };

        let saved = match editing_id {
            Some(id) => self.update_expense(db, &id, &input),
            None => self.add_expense(db, &input),
        };
        if saved {
            self.close_forms();
        }
    }

    pub(crate) fn submit_budget_form(&mut self, db: &Database) {
        let Some(form) = self.budget_form.as_ref() else {
            return;
        };
        let period = form.period;
        match form.validate() {
            Ok(amount) => {
                if self.set_budget(db, period, amount) {
                    self.close_forms();
                }
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ── Confirmation ──────────────────────────────────────────

    pub(crate) fn request_delete(&mut self) {
        let Some((id, label)) = self
            .selected_expense()
            .map(|e| (e.id.clone(), format!("{} on {}", self.money(e.amount), e.date)))
        else {
            self.set_status("No expense selected");
            return;
        };
        self.confirm_message = format!("Delete {label}?");
        self.pending_action = Some(PendingAction::DeleteExpense { id, label });
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn confirm_pending(&mut self, db: &Database) {
        if let Some(action) = self.pending_action.take() {
            match action {
                PendingAction::DeleteExpense { id, label } => {
                    if self.delete_expense(db, &id) {
                        self.set_status(format!("Deleted {label}"));
                    }
                }
            }
        }
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
    }

    pub(crate) fn cancel_pending(&mut self) {
        self.pending_action = None;
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        self.set_status("Cancelled");
    }

    // ── Auth ──────────────────────────────────────────────────

    pub(crate) fn submit_login(&mut self, db: &Database) {
        let email = self.login.email.clone();
        let password = self.login.password.clone();
        let result = if self.login.is_sign_up {
            self.auth.sign_up(db, &email, &password).map(|u| u.email.clone())
        } else {
            self.auth.sign_in(db, &email, &password).map(|u| u.email.clone())
        };

        match result {
            Ok(email) => {
                self.login = LoginForm::new();
                self.screen = Screen::Home;
                self.go_to_today(db);
                self.set_status(format!("Signed in as {email}"));
            }
            Err(AuthError::Store(e)) => {
                tracing::error!("Authentication failed: {e:#}");
                self.login.set_error(STORE_FAILURE);
            }
            Err(e @ AuthError::Hash(_)) => {
                tracing::error!("Authentication failed: {e}");
                self.login.set_error(STORE_FAILURE);
            }
            Err(e) => {
                self.login.password.clear();
                self.login.set_error(e.to_string());
            }
        }
    }

    pub(crate) fn logout(&mut self, db: &Database) {
        if let Err(e) = self.auth.sign_out(db) {
            tracing::error!("Failed to sign out: {e}");
            self.set_status(STORE_FAILURE);
            return;
        }
        self.expenses.clear();
        self.budget = None;
        self.report = None;
        self.expense_index = 0;
        self.expense_scroll = 0;
        self.close_forms();
        self.pending_action = None;
        self.screen = Screen::Home;
        self.status_message.clear();
        self.login = LoginForm::new();
        self.login.set_info("Signed out");
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
