#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::auth::AuthContext;
use crate::config::Config;
use crate::models::{Session, User, YearMonth};

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

/// Signed-in app on March 2024, today = 2024-03-15.
fn setup(dir: &tempfile::TempDir) -> (Database, App) {
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
    app.today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    app.set_period(&db, ym(2024, 3));
    (db, app)
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("budget", "budget"), 0);
    assert_eq!(levenshtein("budgt", "budget"), 1);
    assert_eq!(levenshtein("", "add"), 3);
}

#[test]
fn test_unknown_command_suggests() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("reprot", &mut app, &db).unwrap();
    assert_eq!(
        app.status_message,
        "Unknown command: :reprot. Did you mean :report?"
    );
}

#[test]
fn test_every_alias_has_a_long_form() {
    let descriptions: Vec<&str> = COMMANDS
        .iter()
        .filter(|(name, _)| name.len() > 1)
        .map(|(_, cmd)| cmd.description)
        .collect();
    for (name, cmd) in COMMANDS.iter().filter(|(name, _)| name.len() == 1) {
        let stem = cmd.description.split(" (").next().unwrap();
        assert!(
            descriptions.iter().any(|d| d.starts_with(stem)),
            "alias :{name} has no long form"
        );
    }
}

#[test]
fn test_add_with_args() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);

    handle_command("add 1200 2024-03-05 lunch with team", &mut app, &db).unwrap();
    assert_eq!(app.expenses.len(), 1);
    assert_eq!(app.expenses[0].amount, dec!(1200));
    assert_eq!(app.expenses[0].date.to_string(), "2024-03-05");
    assert_eq!(app.expenses[0].description, "lunch with team");

    handle_command("a 500 coffee beans", &mut app, &db).unwrap();
    assert_eq!(app.expenses[0].date.to_string(), "2024-03-15");
    assert_eq!(app.expenses[0].description, "coffee beans");
}

#[test]
fn test_add_without_args_opens_form() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("add", &mut app, &db).unwrap();
    assert!(app.expense_form.is_some());
}

#[test]
fn test_add_rejects_bad_amount() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("add -3", &mut app, &db).unwrap();
    assert!(app.expenses.is_empty());
    assert_eq!(app.status_message, "Amount must be greater than zero");
}

#[test]
fn test_add_rejects_malformed_date() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("add 500 2024-02-30 lunch", &mut app, &db).unwrap();
    assert!(app.expenses.is_empty());
    assert_eq!(
        app.status_message,
        "Invalid date '2024-02-30'. Use YYYY-MM-DD"
    );
    let user_id = app.auth.user().unwrap().id.clone();
    assert_eq!(db.expense_count(&user_id).unwrap(), 0);
}

#[test]
fn test_add_rejects_out_of_range_amounts() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);

    handle_command("add 79228162514264337593543950335 2024-03-05", &mut app, &db).unwrap();
    assert!(app.expenses.is_empty());
    assert_eq!(
        app.status_message,
        "Amount is too large (max 1,000,000,000,000)"
    );

    handle_command("budget 0.0000000000000000000000001", &mut app, &db).unwrap();
    assert_eq!(app.budget_amount(), dec!(0));
    assert_eq!(app.status_message, "Use at most 2 decimal places");

    handle_command("add 1000 2024-03-05", &mut app, &db).unwrap();
    handle_command("add 1 2024-03-06", &mut app, &db).unwrap();
    assert_eq!(app.summary().total_spent, dec!(1001));
}

#[test]
fn test_budget_command() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);

    handle_command("budget 50,000", &mut app, &db).unwrap();
    assert_eq!(app.budget_amount(), dec!(50000));
    assert_eq!(app.status_message, "Budget for March 2024: ¥50,000");

    handle_command("b -1", &mut app, &db).unwrap();
    assert_eq!(app.budget_amount(), dec!(50000));

    handle_command("budget clear", &mut app, &db).unwrap();
    assert!(app.budget.is_none());
}

#[test]
fn test_month_command() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);

    handle_command("month 2023-12", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2023, 12));
    assert_eq!(app.status_message, "Switched to month: December 2023");

    handle_command("m 7", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2023, 7));

    handle_command("m 13", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2023, 7));
    assert!(app.status_message.starts_with("Invalid month '13'"));

    handle_command("month", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2024, 3));
}

#[test]
fn test_month_navigation_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("next-month", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2024, 4));
    handle_command("prev-month", &mut app, &db).unwrap();
    handle_command("prev-month", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2024, 2));
    handle_command("today", &mut app, &db).unwrap();
    assert_eq!(app.period, ym(2024, 3));
}

#[test]
fn test_export_command() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    let path = dir.path().join("march.csv");
    let cmd = format!("export {}", path.display());

    handle_command(&cmd, &mut app, &db).unwrap();
    assert_eq!(app.status_message, "No expenses for March 2024");
    assert!(!path.exists());

    handle_command("add 800", &mut app, &db).unwrap();
    handle_command(&cmd, &mut app, &db).unwrap();
    assert_eq!(
        app.status_message,
        format!("Exported 1 expenses to {}", path.display())
    );
    assert!(std::fs::read_to_string(&path).unwrap().contains("2024-03-15,800,"));
}

#[test]
fn test_screen_and_quit_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("report", &mut app, &db).unwrap();
    assert_eq!(app.screen, Screen::Report);
    handle_command("home", &mut app, &db).unwrap();
    assert_eq!(app.screen, Screen::Home);
    handle_command("help", &mut app, &db).unwrap();
    assert!(app.show_help);
    handle_command("q", &mut app, &db).unwrap();
    assert!(!app.running);
}

#[test]
fn test_logout_command() {
    let dir = tempfile::tempdir().unwrap();
    let (db, mut app) = setup(&dir);
    handle_command("logout", &mut app, &db).unwrap();
    assert!(!app.is_signed_in());
}
