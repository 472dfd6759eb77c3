//! Input parsing and form state shared by the TUI and the CLI.
//!
//! Validation happens here, before anything is sent to the store.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Expense, YearMonth};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

/// Largest amount accepted for an expense or a budget (one trillion).
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

pub(crate) const MAX_DECIMAL_PLACES: u32 = 2;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

static DATE_SHAPE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").ok());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FormError {
    #[error("Enter an amount")]
    MissingAmount,
    #[error("Not a number: {0}")]
    InvalidAmount(String),
    #[error("Amount is too large (max 1,000,000,000,000)")]
    AmountTooLarge,
    #[error("Use at most {} decimal places", MAX_DECIMAL_PLACES)]
    TooManyDecimals,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Budget cannot be negative (use 0 for no limit)")]
    NegativeBudget,
    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid month '{0}'. Use YYYY-MM (e.g. 2024-01)")]
    InvalidMonth(String),
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
}

fn parse_decimal(input: &str) -> Result<Decimal, FormError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(['¥', '$', '€', '£'])
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(FormError::MissingAmount);
    }
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| FormError::InvalidAmount(input.trim().to_string()))?;
    if amount.abs() > MAX_AMOUNT {
        return Err(FormError::AmountTooLarge);
    }
    if amount.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(FormError::TooManyDecimals);
    }
    Ok(amount)
}

/// Expense amounts must be strictly positive.
pub(crate) fn parse_expense_amount(input: &str) -> Result<Decimal, FormError> {
    let amount = parse_decimal(input)?;
    if amount <= Decimal::ZERO {
        return Err(FormError::NonPositiveAmount);
    }
    Ok(amount)
}

/// Budgets may be zero, which means "no limit".
pub(crate) fn parse_budget_amount(input: &str) -> Result<Decimal, FormError> {
    let amount = parse_decimal(input)?;
    if amount < Decimal::ZERO {
        return Err(FormError::NegativeBudget);
    }
    Ok(amount)
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| FormError::InvalidDate(input.trim().to_string()))
}

/// Optional date argument of a one-line add: `Ok(None)` when `token` is not
/// meant as a date, an error when it looks like one but is not a real day.
pub(crate) fn parse_date_token(token: &str) -> Result<Option<NaiveDate>, FormError> {
    if let Ok(date) = parse_date(token) {
        return Ok(Some(date));
    }
    let date_shaped = DATE_SHAPE_RE
        .as_ref()
        .is_some_and(|re| re.is_match(token.trim()));
    if date_shaped {
        return Err(FormError::InvalidDate(token.trim().to_string()));
    }
    Ok(None)
}

/// Accepts `YYYY-MM`, `YYYY-M`, or a bare month number in `default_year`.
pub(crate) fn parse_month(input: &str, default_year: i32) -> Result<YearMonth, FormError> {
    let trimmed = input.trim();
    let parsed = if trimmed.len() <= 2 {
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(|m| YearMonth::new(default_year, m))
    } else {
        YearMonth::parse(trimmed)
    };
    parsed.ok_or_else(|| FormError::InvalidMonth(trimmed.to_string()))
}

pub(crate) fn validate_credentials(email: &str, password: &str) -> Result<(), FormError> {
    let valid_email = EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()));
    if !valid_email {
        return Err(FormError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    Ok(())
}

// ── Form state ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpenseField {
    Amount,
    Date,
    Description,
}

impl ExpenseField {
    fn next(self) -> Self {
        match self {
            Self::Amount => Self::Date,
            Self::Date => Self::Description,
            Self::Description => Self::Amount,
        }
    }
}

/// Validated contents of an [`ExpenseForm`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExpenseInput {
    pub(crate) amount: Decimal,
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ExpenseForm {
    pub(crate) amount: String,
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) focus: ExpenseField,
    /// Set when the form edits an existing expense.
    pub(crate) editing_id: Option<String>,
}

impl ExpenseForm {
    pub(crate) fn new(default_date: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            date: default_date.format("%Y-%m-%d").to_string(),
            description: String::new(),
            focus: ExpenseField::Amount,
            editing_id: None,
        }
    }

    pub(crate) fn edit(expense: &Expense) -> Self {
        Self {
            amount: expense.amount.normalize().to_string(),
            date: expense.date.format("%Y-%m-%d").to_string(),
            description: expense.description.clone(),
            focus: ExpenseField::Amount,
            editing_id: Some(expense.id.clone()),
        }
    }

    pub(crate) fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            ExpenseField::Amount => &mut self.amount,
            ExpenseField::Date => &mut self.date,
            ExpenseField::Description => &mut self.description,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub(crate) fn validate(&self) -> Result<ExpenseInput, FormError> {
        Ok(ExpenseInput {
            amount: parse_expense_amount(&self.amount)?,
            date: parse_date(&self.date)?,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BudgetForm {
    pub(crate) amount: String,
    pub(crate) period: YearMonth,
}

impl BudgetForm {
    pub(crate) fn new(period: YearMonth, current: Decimal) -> Self {
        Self {
            amount: current.normalize().to_string(),
            period,
        }
    }

    pub(crate) fn validate(&self) -> Result<Decimal, FormError> {
        parse_budget_amount(&self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginField {
    Email,
    Password,
}

#[derive(Debug, Clone)]
pub(crate) struct LoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) focus: LoginField,
    pub(crate) is_sign_up: bool,
    /// Feedback line; the flag marks it as an error.
    pub(crate) message: Option<(String, bool)>,
}

impl LoginForm {
    pub(crate) fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: LoginField::Email,
            is_sign_up: false,
            message: None,
        }
    }

    pub(crate) fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub(crate) fn toggle_mode(&mut self) {
        self.is_sign_up = !self.is_sign_up;
        self.message = None;
    }

    pub(crate) fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some((msg.into(), true));
    }

    pub(crate) fn set_info(&mut self, msg: impl Into<String>) {
        self.message = Some((msg.into(), false));
    }
}
