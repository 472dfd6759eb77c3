//! Budget-vs-spend derivations for a calendar month.
//!
//! Everything here is a pure function of the expense list, the viewed month
//! and the budget amount. Screens recompute these on every draw.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Expense, YearMonth};

/// Percentage points of slack around the expected spend before the month is
/// reported as ahead of or behind pace.
pub(crate) const PACE_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Width of a weekly bucket in days.
const WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlySummary {
    pub(crate) period: YearMonth,
    pub(crate) budget_amount: Decimal,
    pub(crate) total_spent: Decimal,
    pub(crate) remaining: Decimal,
    /// Raw percentage of the budget used. Not clamped.
    pub(crate) progress_percent: Decimal,
    pub(crate) expense_count: usize,
}

impl MonthlySummary {
    /// Filter `expenses` to `period` and summarize them.
    pub(crate) fn for_month(expenses: &[Expense], period: YearMonth, budget_amount: Decimal) -> Self {
        summarize(period, filter_by_month(expenses, period), budget_amount)
    }

    pub(crate) fn has_budget(&self) -> bool {
        self.budget_amount > Decimal::ZERO
    }

    pub(crate) fn is_over_budget(&self) -> bool {
        self.has_budget() && self.total_spent > self.budget_amount
    }

    /// Fill ratio for a progress bar, clamped to [0, 1].
    pub(crate) fn progress_bar_ratio(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        (self.progress_percent / Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

pub(crate) fn filter_by_month(expenses: &[Expense], period: YearMonth) -> Vec<&Expense> {
    expenses.iter().filter(|e| period.contains(e.date)).collect()
}

pub(crate) fn summarize<'a>(
    period: YearMonth,
    expenses: impl IntoIterator<Item = &'a Expense>,
    budget_amount: Decimal,
) -> MonthlySummary {
    let (total_spent, expense_count) = expenses
        .into_iter()
        .fold((Decimal::ZERO, 0), |(sum, n), e| {
            (sum.saturating_add(e.amount), n + 1)
        });

    MonthlySummary {
        period,
        budget_amount,
        total_spent,
        remaining: budget_amount.saturating_sub(total_spent),
        progress_percent: percent_of(total_spent, budget_amount),
        expense_count,
    }
}

/// `part / whole * 100`, saturating at `Decimal::MAX` for ratios too large
/// to represent. Zero when `whole` is not positive.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

// ── Pacing ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Pace {
    OnPace,
    /// Spending faster than the calendar; `excess` percentage points ahead.
    Ahead { excess: Decimal },
    /// Spending slower than the calendar; `deficit` percentage points behind.
    Behind { deficit: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PaceReport {
    /// Share of the month elapsed as of today, in percent.
    pub(crate) expected_percent: Decimal,
    pub(crate) pace: Pace,
}

/// Compare spend against the elapsed share of the month.
///
/// Only meaningful for the month containing `today` with a budget set;
/// returns `None` otherwise.
pub(crate) fn pacing(
    period: YearMonth,
    total_spent: Decimal,
    budget_amount: Decimal,
    today: NaiveDate,
) -> Option<PaceReport> {
    if !period.contains(today) || budget_amount <= Decimal::ZERO {
        return None;
    }

    let expected_percent = elapsed_percent(period, today);
    let diff = percent_of(total_spent, budget_amount).saturating_sub(expected_percent);

    let pace = if diff.abs() < PACE_TOLERANCE {
        Pace::OnPace
    } else if diff > Decimal::ZERO {
        Pace::Ahead { excess: diff }
    } else {
        Pace::Behind { deficit: diff.abs() }
    };

    Some(PaceReport {
        expected_percent,
        pace,
    })
}

/// Percent of `period` elapsed on `today`, counting today as elapsed.
pub(crate) fn elapsed_percent(period: YearMonth, today: NaiveDate) -> Decimal {
    percent_of(
        Decimal::from(today.day()),
        Decimal::from(period.days_in_month()),
    )
}

// ── Weekly buckets ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeekBucket {
    pub(crate) start_day: u32,
    pub(crate) end_day: u32,
    pub(crate) total: Decimal,
}

impl WeekBucket {
    pub(crate) fn label(&self) -> String {
        format!("{}-{}", self.start_day, self.end_day)
    }
}

/// Split a month into 7-day windows starting on day 1 (1-7, 8-14, 15-21,
/// 22-28, 29-end) and sum the amounts in each. The last window is cut at
/// `days_in_month`; windows that would start past it are omitted.
pub(crate) fn weekly_buckets<'a>(
    expenses_in_month: impl IntoIterator<Item = &'a Expense>,
    days_in_month: u32,
) -> Vec<WeekBucket> {
    let mut buckets: Vec<WeekBucket> = (0..)
        .map(|week| week * WEEK_DAYS + 1)
        .take_while(|start| *start <= days_in_month)
        .map(|start_day| WeekBucket {
            start_day,
            end_day: (start_day + WEEK_DAYS - 1).min(days_in_month),
            total: Decimal::ZERO,
        })
        .collect();

    for expense in expenses_in_month {
        let day = expense.date.day();
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| (b.start_day..=b.end_day).contains(&day))
        {
            bucket.total = bucket.total.saturating_add(expense.amount);
        }
    }

    buckets
}

// ── Trailing months ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthTotal {
    pub(crate) period: YearMonth,
    pub(crate) total: Decimal,
    pub(crate) count: usize,
}

/// Totals for the `n` months ending at `period`, oldest first.
pub(crate) fn trailing_months(expenses: &[Expense], period: YearMonth, n: usize) -> Vec<MonthTotal> {
    (0..n)
        .rev()
        .filter_map(|i| period.shift(-(i as i32)))
        .map(|month| {
            let summary = summarize(month, filter_by_month(expenses, month), Decimal::ZERO);
            MonthTotal {
                period: month,
                total: summary.total_spent,
                count: summary.expense_count,
            }
        })
        .collect()
}

/// Percent change from `previous` to `current`; zero when there is no
/// previous spend to compare against.
pub(crate) fn month_over_month_change(current: Decimal, previous: Decimal) -> Decimal {
    percent_of(current.saturating_sub(previous), previous)
}

// ── Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyReport {
    pub(crate) period: YearMonth,
    pub(crate) total: Decimal,
    pub(crate) count: usize,
    pub(crate) change_percent: Decimal,
    pub(crate) trend: Vec<MonthTotal>,
    pub(crate) weeks: Vec<WeekBucket>,
}

impl MonthlyReport {
    /// `expenses` should cover at least the `trend_months` months ending at
    /// `period`; anything outside that window is ignored.
    pub(crate) fn build(expenses: &[Expense], period: YearMonth, trend_months: usize) -> Self {
        let current = filter_by_month(expenses, period);
        let summary = summarize(period, current.iter().copied(), Decimal::ZERO);

        let previous_total = period
            .prev()
            .map(|prev| {
                summarize(prev, filter_by_month(expenses, prev), Decimal::ZERO).total_spent
            })
            .unwrap_or(Decimal::ZERO);

        Self {
            period,
            total: summary.total_spent,
            count: summary.expense_count,
            change_percent: month_over_month_change(summary.total_spent, previous_total),
            trend: trailing_months(expenses, period, trend_months.max(1)),
            weeks: weekly_buckets(current, period.days_in_month()),
        }
    }

    /// First day of the window the report needs data for.
    pub(crate) fn window_start(period: YearMonth, trend_months: usize) -> NaiveDate {
        let back = trend_months.max(2).saturating_sub(1) as i32;
        period
            .shift(-back)
            .unwrap_or(period)
            .first_day()
    }
}
