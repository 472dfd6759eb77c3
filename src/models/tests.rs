#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── YearMonth ─────────────────────────────────────────────────

#[test]
fn test_new_rejects_invalid_month() {
    assert!(YearMonth::new(2024, 0).is_none());
    assert!(YearMonth::new(2024, 13).is_none());
    assert!(YearMonth::new(2024, 12).is_some());
}

#[test]
fn test_parse() {
    assert_eq!(YearMonth::parse("2024-03"), Some(ym(2024, 3)));
    assert_eq!(YearMonth::parse("2024-3"), Some(ym(2024, 3)));
    assert_eq!(YearMonth::parse(" 2024-11 "), Some(ym(2024, 11)));
    assert_eq!(YearMonth::parse("2024-13"), None);
    assert_eq!(YearMonth::parse("24-03"), None);
    assert_eq!(YearMonth::parse("2024"), None);
    assert_eq!(YearMonth::parse("2024-03-01"), None);
    assert_eq!(YearMonth::parse(""), None);
}

#[test]
fn test_display_zero_pads() {
    assert_eq!(ym(2024, 3).to_string(), "2024-03");
    assert_eq!(ym(2023, 12).to_string(), "2023-12");
}

#[test]
fn test_labels() {
    assert_eq!(ym(2024, 3).label(), "March 2024");
    assert_eq!(ym(2024, 9).short_label(), "Sep");
}

#[test]
fn test_days_in_month() {
    assert_eq!(ym(2024, 1).days_in_month(), 31);
    assert_eq!(ym(2024, 4).days_in_month(), 30);
    assert_eq!(ym(2024, 2).days_in_month(), 29);
    assert_eq!(ym(2023, 2).days_in_month(), 28);
    assert_eq!(ym(1900, 2).days_in_month(), 28);
    assert_eq!(ym(2000, 2).days_in_month(), 29);
    assert_eq!(ym(2023, 12).days_in_month(), 31);
    assert_eq!(YearMonth::from_date(NaiveDate::MAX).days_in_month(), 31);
    assert_eq!(YearMonth::from_date(NaiveDate::MAX).last_day(), NaiveDate::MAX);
}

#[test]
fn test_month_boundaries() {
    let feb = ym(2023, 2);
    assert_eq!(feb.first_day(), date("2023-02-01"));
    assert_eq!(feb.last_day(), date("2023-02-28"));
    assert_eq!(ym(2024, 12).last_day(), date("2024-12-31"));
}

#[test]
fn test_contains_is_inclusive() {
    let march = ym(2024, 3);
    assert!(march.contains(date("2024-03-01")));
    assert!(march.contains(date("2024-03-31")));
    assert!(!march.contains(date("2024-02-29")));
    assert!(!march.contains(date("2024-04-01")));
    assert!(!march.contains(date("2023-03-15")));
}

#[test]
fn test_from_date() {
    assert_eq!(YearMonth::from_date(date("2024-03-31")), ym(2024, 3));
    assert_eq!(YearMonth::from_date(date("2024-01-01")), ym(2024, 1));
}

#[test]
fn test_shift_rolls_year() {
    assert_eq!(ym(2024, 1).prev(), Some(ym(2023, 12)));
    assert_eq!(ym(2023, 12).shift(1), Some(ym(2024, 1)));
    assert_eq!(ym(2024, 1).shift(-11), Some(ym(2023, 2)));
    assert_eq!(ym(2024, 1).shift(-25), Some(ym(2021, 12)));
    assert_eq!(ym(2024, 5).shift(0), Some(ym(2024, 5)));
    assert_eq!(ym(2024, 11).shift(14), Some(ym(2026, 1)));
}

#[test]
fn test_ordering() {
    assert!(ym(2023, 12) < ym(2024, 1));
    assert!(ym(2024, 2) > ym(2024, 1));
}

// ── Expense / Budget / User ───────────────────────────────────

#[test]
fn test_expense_new_assigns_id_and_period() {
    let a = Expense::new("u1".into(), dec!(1000), date("2024-03-05"), String::new());
    let b = Expense::new("u1".into(), dec!(1000), date("2024-03-05"), String::new());
    assert_ne!(a.id, b.id);
    assert_eq!(a.period(), ym(2024, 3));
    assert_eq!(a.created_at, a.updated_at);
}

#[test]
fn test_budget_zero_is_unlimited() {
    assert!(Budget::new("u1".into(), ym(2024, 3), dec!(0)).is_unlimited());
    assert!(!Budget::new("u1".into(), ym(2024, 3), dec!(50000)).is_unlimited());
}

#[test]
fn test_user_email_normalized() {
    let user = User::new("  Someone@Example.COM ", "hash".into());
    assert_eq!(user.email, "someone@example.com");
}

#[test]
fn test_session_tokens_unique() {
    let user = User::new("a@b.co", "hash".into());
    let s1 = Session::new(user.clone());
    let s2 = Session::new(user);
    assert_ne!(s1.token, s2.token);
}
