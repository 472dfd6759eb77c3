#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::ledger::Pace;
use crate::models::{Session, User};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

fn input(amount: Decimal, day: &str, description: &str) -> ExpenseInput {
    ExpenseInput {
        amount,
        date: date(day),
        description: description.into(),
    }
}

struct Fixture {
    db: Database,
    app: App,
    _dir: tempfile::TempDir,
}

/// Signed-in app viewing March 2024 with today = 2024-03-15.
fn signed_in() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_create(dir.path()).unwrap();
    let db = Database::open_in_memory().unwrap();

    let user = User::new("me@example.com", "$argon2id$unused".into());
    db.insert_user(&user).unwrap();
    let session = Session::new(user);
    db.insert_session(&session).unwrap();
    std::fs::write(config.session_path(), &session.token).unwrap();

    let mut auth = AuthContext::new(config.session_path());
    auth.load(&db).unwrap();

    let mut app = App::new(auth, &config);
    app.today = date("2024-03-15");
    assert!(app.set_period(&db, ym(2024, 3)));
    Fixture {
        db,
        app,
        _dir: dir,
    }
}

// ── Summary ───────────────────────────────────────────────────

#[test]
fn test_month_summary_after_adds() {
    let Fixture { db, mut app, _dir } = signed_in();
    assert!(app.add_expense(&db, &input(dec!(1000), "2024-03-05", "")));
    assert!(app.add_expense(&db, &input(dec!(2000), "2024-03-20", "groceries")));
    assert!(app.set_budget(&db, ym(2024, 3), dec!(5000)));

    assert_eq!(app.expenses[0].amount, dec!(2000));
    let summary = app.summary();
    assert_eq!(summary.total_spent, dec!(3000));
    assert_eq!(summary.remaining, dec!(2000));
    assert_eq!(summary.progress_percent, dec!(60));
    assert!(!summary.is_over_budget());
}

#[test]
fn test_add_outside_viewed_month_is_not_listed() {
    let Fixture { db, mut app, _dir } = signed_in();
    assert!(app.add_expense(&db, &input(dec!(500), "2024-04-02", "")));
    assert!(app.expenses.is_empty());
    assert_eq!(app.status_message, "Added ¥500 on 2024-04-02");

    app.shift_period(&db, 1);
    assert_eq!(app.period, ym(2024, 4));
    assert_eq!(app.expenses.len(), 1);
}

#[test]
fn test_report_follows_changes() {
    let Fixture { db, mut app, _dir } = signed_in();
    assert_eq!(app.report.as_ref().unwrap().total, dec!(0));
    app.add_expense(&db, &input(dec!(1200), "2024-03-01", ""));
    let report = app.report.as_ref().unwrap();
    assert_eq!(report.total, dec!(1200));
    assert_eq!(report.count, 1);
    assert_eq!(report.trend.len(), 12);
    assert_eq!(report.weeks.len(), 5);
}

#[test]
fn test_pace_only_for_current_month() {
    let Fixture { db, mut app, _dir } = signed_in();
    assert!(app.pace().is_none());

    app.set_budget(&db, ym(2024, 3), dec!(10000));
    app.add_expense(&db, &input(dec!(4800), "2024-03-02", ""));
    assert_eq!(app.pace().unwrap().pace, Pace::OnPace);

    app.shift_period(&db, -1);
    assert!(!app.is_current_month());
    assert!(app.pace().is_none());
}

// ── Forms ─────────────────────────────────────────────────────

#[test]
fn test_add_form_default_date() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.open_add_form();
    assert_eq!(app.input_mode, InputMode::ExpenseForm);
    assert_eq!(app.expense_form.as_ref().unwrap().date, "2024-03-15");

    app.close_forms();
    app.shift_period(&db, -1);
    app.open_add_form();
    assert_eq!(app.expense_form.as_ref().unwrap().date, "2024-02-01");
}

#[test]
fn test_invalid_form_never_reaches_store() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.open_add_form();
    app.expense_form.as_mut().unwrap().amount = "abc".into();
    app.submit_expense_form(&db);

    assert_eq!(app.input_mode, InputMode::ExpenseForm);
    assert_eq!(app.status_message, "Not a number: abc");
    let user_id = app.auth.user().unwrap().id.clone();
    assert_eq!(db.expense_count(&user_id).unwrap(), 0);
}

#[test]
fn test_submit_add_form() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.open_add_form();
    app.expense_form.as_mut().unwrap().amount = "¥1,500".into();
    app.submit_expense_form(&db);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.expense_form.is_none());
    assert_eq!(app.expenses.len(), 1);
    assert_eq!(app.expenses[0].amount, dec!(1500));
    assert_eq!(app.expenses[0].date, date("2024-03-15"));
}

#[test]
fn test_edit_replaces_in_place() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1000), "2024-03-05", "lunch"));
    app.add_expense(&db, &input(dec!(2000), "2024-03-20", "books"));
    app.expense_index = 1;

    app.open_edit_form();
    assert_eq!(app.editing_id(), Some(app.expenses[1].id.as_str()));
    let form = app.expense_form.as_mut().unwrap();
    assert_eq!(form.amount, "1000");
    form.amount = "1500".into();
    app.submit_expense_form(&db);

    assert!(app.editing_id().is_none());
    assert_eq!(app.expenses.len(), 2);
    assert_eq!(app.expenses[1].amount, dec!(1500));
    assert_eq!(app.expenses[1].description, "lunch");
    assert_eq!(app.summary().total_spent, dec!(3500));
}

#[test]
fn test_edit_moving_out_of_month_drops_row() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1000), "2024-03-05", ""));
    let id = app.expenses[0].id.clone();

    assert!(app.update_expense(&db, &id, &input(dec!(1000), "2024-02-28", "")));
    assert!(app.expenses.is_empty());
    assert_eq!(app.expense_index, 0);
}

#[test]
fn test_list_stays_newest_first() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1), "2024-03-20", "later"));
    app.add_expense(&db, &input(dec!(2), "2024-03-05", "earlier"));

    let days: Vec<String> = app.expenses.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(days, ["2024-03-20", "2024-03-05"]);
    assert_eq!(app.selected_expense().unwrap().description, "earlier");

    let id = app.expenses[1].id.clone();
    assert!(app.update_expense(&db, &id, &input(dec!(2), "2024-03-25", "earlier")));
    let days: Vec<String> = app.expenses.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(days, ["2024-03-25", "2024-03-20"]);
    assert_eq!(app.expense_index, 0);

    // Matches a fresh load from the store.
    let listed: Vec<String> = app.expenses.iter().map(|e| e.id.clone()).collect();
    app.reload(&db);
    let reloaded: Vec<String> = app.expenses.iter().map(|e| e.id.clone()).collect();
    assert_eq!(listed, reloaded);
}

#[test]
fn test_edit_without_selection() {
    let Fixture { mut app, _dir, .. } = signed_in();
    app.open_edit_form();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.status_message, "No expense selected");
}

#[test]
fn test_budget_form() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.open_budget_form();
    assert_eq!(app.budget_form.as_ref().unwrap().amount, "0");

    app.budget_form.as_mut().unwrap().amount = "-5".into();
    app.submit_budget_form(&db);
    assert_eq!(app.input_mode, InputMode::BudgetForm);
    assert!(app.budget.is_none());

    app.budget_form.as_mut().unwrap().amount = "60,000".into();
    app.submit_budget_form(&db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.budget_amount(), dec!(60000));
    assert!(app.summary().has_budget());
}

#[test]
fn test_clear_budget() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.set_budget(&db, ym(2024, 3), dec!(50000));
    assert!(app.clear_budget(&db));
    assert!(app.budget.is_none());
    app.reload(&db);
    assert!(app.budget.is_none());
}

// ── Delete ────────────────────────────────────────────────────

#[test]
fn test_delete_requires_confirmation() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1000), "2024-03-05", ""));

    app.request_delete();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(app.confirm_message, "Delete ¥1,000 on 2024-03-05?");
    app.cancel_pending();
    assert_eq!(app.expenses.len(), 1);

    app.request_delete();
    app.confirm_pending(&db);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.expenses.is_empty());
    assert_eq!(app.status_message, "Deleted ¥1,000 on 2024-03-05");
    let user_id = app.auth.user().unwrap().id.clone();
    assert_eq!(db.expense_count(&user_id).unwrap(), 0);
}

#[test]
fn test_delete_clamps_selection() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1), "2024-03-05", ""));
    app.add_expense(&db, &input(dec!(2), "2024-03-06", ""));
    app.expense_index = 1;
    let id = app.expenses[1].id.clone();
    app.delete_expense(&db, &id);
    assert_eq!(app.expense_index, 0);
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn test_store_failure_leaves_state_unchanged() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1000), "2024-03-05", ""));
    app.set_budget(&db, ym(2024, 3), dec!(5000));

    // The signed-in user does not exist here, so writes violate the foreign key.
    let other = Database::open_in_memory().unwrap();
    assert!(!app.add_expense(&other, &input(dec!(9), "2024-03-06", "")));
    assert_eq!(app.status_message, STORE_FAILURE);
    assert_eq!(app.expenses.len(), 1);

    assert!(!app.set_budget(&other, ym(2024, 3), dec!(1)));
    assert_eq!(app.budget_amount(), dec!(5000));
}

#[test]
fn test_failed_submit_keeps_form_open() {
    let Fixture { mut app, _dir, .. } = signed_in();
    let other = Database::open_in_memory().unwrap();
    app.open_add_form();
    app.expense_form.as_mut().unwrap().amount = "100".into();
    app.submit_expense_form(&other);
    assert_eq!(app.input_mode, InputMode::ExpenseForm);
    assert!(app.expense_form.is_some());
}

// ── Navigation ────────────────────────────────────────────────

#[test]
fn test_navigation_rolls_year() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.set_period(&db, ym(2024, 1));
    app.shift_period(&db, -1);
    assert_eq!(app.period, ym(2023, 12));
    assert_eq!(app.status_message, "Month: December 2023");

    app.go_to_today(&db);
    assert_eq!(app.period, ym(2024, 3));
}

// ── Auth ──────────────────────────────────────────────────────

#[test]
fn test_logout_clears_state() {
    let Fixture { db, mut app, _dir } = signed_in();
    app.add_expense(&db, &input(dec!(1000), "2024-03-05", ""));
    app.logout(&db);

    assert!(!app.is_signed_in());
    assert!(app.expenses.is_empty());
    assert!(app.report.is_none());
    assert_eq!(app.login.message, Some(("Signed out".to_string(), false)));
}

#[test]
fn test_login_form_sign_up_then_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_create(dir.path()).unwrap();
    let db = Database::open_in_memory().unwrap();
    let mut auth = AuthContext::new(config.session_path());
    auth.load(&db).unwrap();
    let mut app = App::new(auth, &config);
    app.today = date("2024-03-15");
    assert!(!app.is_signed_in());

    app.login.toggle_mode();
    app.login.email = "me@example.com".into();
    app.login.password = "secret1".into();
    app.submit_login(&db);
    assert!(app.is_signed_in());
    assert_eq!(app.period, ym(2024, 3));
    assert_eq!(app.status_message, "Signed in as me@example.com");

    app.logout(&db);
    app.login.email = "me@example.com".into();
    app.login.password = "wrong-password".into();
    app.submit_login(&db);
    assert!(!app.is_signed_in());
    assert!(app.login.password.is_empty());
    assert_eq!(
        app.login.message,
        Some(("Incorrect email or password".to_string(), true))
    );
}
