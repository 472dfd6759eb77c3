use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::auth::{AuthContext, AuthState};
use crate::config::{Config, Currency};
use crate::db::Database;
use crate::export;
use crate::ledger::{self, MonthlyReport, MonthlySummary, Pace};
use crate::models::{User, YearMonth};
use crate::ui::forms::{
    parse_budget_amount, parse_date, parse_date_token, parse_expense_amount, parse_month,
    ExpenseInput,
};
use crate::ui::util::{format_amount, format_change, format_percent, truncate};

pub(crate) fn as_cli(
    args: &[String],
    db: &Database,
    config: &Config,
    auth: &mut AuthContext,
) -> Result<()> {
    let rest = &args[2..];
    let ctx = Ctx {
        db,
        currency: config.currency(),
        today: chrono::Local::now().date_naive(),
    };
    match args[1].as_str() {
        "signup" => cli_signup(rest, db, auth),
        "login" => cli_login(rest, db, auth),
        "logout" => cli_logout(db, auth),
        "whoami" => cli_whoami(&ctx, config, auth),
        "add" | "a" => cli_add(rest, &ctx, signed_in(auth)?),
        "edit" | "e" => cli_edit(rest, &ctx, signed_in(auth)?),
        "delete" | "rm" => cli_delete(rest, &ctx, signed_in(auth)?),
        "list" | "ls" => cli_list(rest, &ctx, signed_in(auth)?),
        "budget" | "b" => cli_budget(rest, &ctx, signed_in(auth)?),
        "summary" | "s" => cli_summary(rest, &ctx, signed_in(auth)?),
        "report" | "r" => cli_report(rest, &ctx, config, signed_in(auth)?),
        "export" => cli_export(rest, &ctx, signed_in(auth)?),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("kakeibo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Kakeibo - household expense tracker with monthly budgets");
    println!();
    println!("Usage: kakeibo [command]");
    println!();
    println!("Commands:");
    println!("  (none)                             Launch interactive TUI");
    println!("  signup <email> [password]          Create an account and sign in");
    println!("  login <email> [password]           Sign in (prompts for the password if omitted)");
    println!("  logout                             Sign out");
    println!("  whoami                             Show the signed-in account");
    println!("  add <amount> [YYYY-MM-DD] [desc]   Record an expense (default: today)");
    println!("  edit <id> <amount> [YYYY-MM-DD]    Change an expense's amount or date");
    println!("  delete <id>                        Delete an expense");
    println!("  list [YYYY-MM]                     List a month's expenses");
    println!("  budget <amount|clear> [YYYY-MM]    Set or clear a monthly budget (0 = no limit)");
    println!("  summary [YYYY-MM]                  Budget vs spend for a month");
    println!("  report [YYYY-MM]                   Trend, weekly breakdown and month-over-month change");
    println!("  export [path]                      Export a month's expenses to CSV");
    println!("    --month <YYYY-MM>                Month to export (default: current)");
    println!("  --help, -h                         Show this help");
    println!("  --version, -V                      Show version");
}

/// Per-invocation state shared by the data commands.
struct Ctx<'a> {
    db: &'a Database,
    currency: &'a Currency,
    today: NaiveDate,
}

impl Ctx<'_> {
    fn money(&self, amount: Decimal) -> String {
        format_amount(amount, self.currency)
    }

    /// Month named by the first positional argument, or the current one.
    fn month_arg(&self, args: &[String]) -> Result<YearMonth> {
        match args.first().filter(|a| !a.starts_with('-')) {
            Some(arg) => Ok(parse_month(arg, self.today.year())?),
            None => Ok(YearMonth::from_date(self.today)),
        }
    }
}

fn signed_in(auth: &AuthContext) -> Result<&User> {
    auth.user()
        .context("Not signed in. Run `kakeibo login <email>` or `kakeibo signup <email>`")
}

// ── Account commands ─────────────────────────────────────────

fn credentials(args: &[String], usage: &str) -> Result<(String, String)> {
    let email = args
        .first()
        .with_context(|| format!("Usage: kakeibo {usage} <email> [password]"))?;
    let password = match args.get(1) {
        Some(p) => p.clone(),
        None => prompt("Password: ")?,
    };
    Ok((email.clone(), password))
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn cli_signup(args: &[String], db: &Database, auth: &mut AuthContext) -> Result<()> {
    let (email, password) = credentials(args, "signup")?;
    let user = auth.sign_up(db, &email, &password)?;
    println!("Created account {} and signed in", user.email);
    Ok(())
}

fn cli_login(args: &[String], db: &Database, auth: &mut AuthContext) -> Result<()> {
    let (email, password) = credentials(args, "login")?;
    let user = auth.sign_in(db, &email, &password)?;
    println!("Signed in as {}", user.email);
    Ok(())
}

fn cli_logout(db: &Database, auth: &mut AuthContext) -> Result<()> {
    let email = auth.user().map(|u| u.email.clone());
    auth.sign_out(db)?;
    match email {
        Some(email) => println!("Signed out {email}"),
        None => println!("Not signed in"),
    }
    Ok(())
}

fn cli_whoami(ctx: &Ctx, config: &Config, auth: &AuthContext) -> Result<()> {
    match auth.state() {
        AuthState::Authenticated(session) => {
            let count = ctx.db.expense_count(&session.user.id)?;
            println!("{}", session.user.email);
            println!("  Member since: {}", session.user.created_at.get(..10).unwrap_or(""));
            println!("  Expenses:     {count}");
        }
        _ => println!("Not signed in"),
    }
    println!("  Data dir:     {}", config.root().display());
    Ok(())
}

// ── Expense commands ─────────────────────────────────────────

fn cli_add(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let input = parse_add_args(args, ctx.today)?;
    let expense = ctx
        .db
        .insert_expense(&user.id, input.amount, input.date, &input.description)?;
    tracing::info!(id = %expense.id, "Added expense");
    println!(
        "Added {} on {} ({})",
        ctx.money(expense.amount),
        expense.date,
        expense.id
    );
    Ok(())
}

/// `<amount> [YYYY-MM-DD] [description…]`; the date defaults to `today`.
fn parse_add_args(args: &[String], today: NaiveDate) -> Result<ExpenseInput> {
    let Some(amount) = args.first() else {
        anyhow::bail!("Usage: kakeibo add <amount> [YYYY-MM-DD] [description]");
    };
    let amount = parse_expense_amount(amount)?;

    let mut rest = &args[1..];
    let date = match rest.first().map(|s| parse_date_token(s)).transpose()?.flatten() {
        Some(date) => {
            rest = &rest[1..];
            date
        }
        None => today,
    };

    Ok(ExpenseInput {
        amount,
        date,
        description: rest.join(" ").trim().to_string(),
    })
}

fn cli_edit(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let (Some(id), Some(amount)) = (args.first(), args.get(1)) else {
        anyhow::bail!("Usage: kakeibo edit <id> <amount> [YYYY-MM-DD]");
    };
    let amount = parse_expense_amount(amount)?;
    let existing = ctx
        .db
        .get_expense(&user.id, id)?
        .with_context(|| format!("No expense with id {id}"))?;
    let date = match args.get(2) {
        Some(d) => parse_date(d)?,
        None => existing.date,
    };

    let updated = ctx
        .db
        .update_expense(&user.id, id, amount, date, &existing.description)?
        .with_context(|| format!("No expense with id {id}"))?;
    tracing::info!(id = %updated.id, "Updated expense");
    println!(
        "Updated {}: {} on {} ({})",
        updated.id,
        ctx.money(updated.amount),
        updated.date,
        updated.period().label()
    );
    Ok(())
}

fn cli_delete(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let Some(id) = args.first() else {
        anyhow::bail!("Usage: kakeibo delete <id>");
    };
    if !ctx.db.delete_expense(&user.id, id)? {
        anyhow::bail!("No expense with id {id}");
    }
    tracing::info!(%id, "Deleted expense");
    println!("Deleted {id}");
    Ok(())
}

fn cli_list(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let period = ctx.month_arg(args)?;
    let expenses = ctx.db.fetch_month_expenses(&user.id, period)?;
    if expenses.is_empty() {
        println!("No expenses for {}", period.label());
        return Ok(());
    }

    println!("{:<36}  {:<10}  {:>14}  Description", "ID", "Date", "Amount");
    println!("{}", "─".repeat(80));
    for e in &expenses {
        println!(
            "{:<36}  {:<10}  {:>14}  {}",
            e.id,
            e.date,
            ctx.money(e.amount),
            truncate(&e.description, 40)
        );
    }
    let summary = MonthlySummary::for_month(&expenses, period, Decimal::ZERO);
    println!("{}", "─".repeat(80));
    println!(
        "{} expenses, total {}",
        summary.expense_count,
        ctx.money(summary.total_spent)
    );
    Ok(())
}

// ── Budget and reporting ─────────────────────────────────────

fn cli_budget(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let Some(amount) = args.first() else {
        anyhow::bail!("Usage: kakeibo budget <amount|clear> [YYYY-MM]");
    };
    let period = ctx.month_arg(&args[1..])?;

    if amount == "clear" {
        if ctx.db.delete_budget(&user.id, period)? {
            println!("Cleared budget for {}", period.label());
        } else {
            println!("No budget set for {}", period.label());
        }
        return Ok(());
    }

    let budget = ctx
        .db
        .upsert_budget(&user.id, period, parse_budget_amount(amount)?)?;
    tracing::info!(%period, "Saved budget");
    if budget.is_unlimited() {
        println!("Budget for {} set to no limit", period.label());
    } else {
        println!(
            "Budget for {} set to {}",
            period.label(),
            ctx.money(budget.amount)
        );
    }
    Ok(())
}

fn cli_summary(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let period = ctx.month_arg(args)?;
    let expenses = ctx.db.fetch_month_expenses(&user.id, period)?;
    let budget_amount = ctx
        .db
        .fetch_budget(&user.id, period)?
        .map_or(Decimal::ZERO, |b| b.amount);
    let summary = MonthlySummary::for_month(&expenses, period, budget_amount);

    println!("Kakeibo - {}", period.label());
    println!("{}", "─".repeat(40));
    if summary.has_budget() {
        println!("  Budget:     {}", ctx.money(summary.budget_amount));
    } else {
        println!("  Budget:     not set");
    }
    println!("  Spent:      {}", ctx.money(summary.total_spent));
    if summary.has_budget() {
        println!("  Remaining:  {}", ctx.money(summary.remaining));
        println!("  Used:       {}", format_percent(summary.progress_percent));
    }
    println!("  Expenses:   {}", summary.expense_count);

    if summary.is_over_budget() {
        println!();
        println!("  OVER BUDGET");
    }

    if let Some(report) = ledger::pacing(period, summary.total_spent, budget_amount, ctx.today) {
        println!();
        println!(
            "  Day {} of {} ({} of the month elapsed)",
            ctx.today.day(),
            period.days_in_month(),
            format_percent(report.expected_percent)
        );
        let pace = match report.pace {
            Pace::OnPace => "On pace for the month".to_string(),
            Pace::Ahead { excess } => {
                format!("Spending faster than expected ({:.1} pts ahead)", excess.round_dp(1))
            }
            Pace::Behind { deficit } => {
                format!("Under pace ({:.1} pts below expected)", deficit.round_dp(1))
            }
        };
        println!("  {pace}");
    }
    Ok(())
}

fn cli_report(args: &[String], ctx: &Ctx, config: &Config, user: &User) -> Result<()> {
    let period = ctx.month_arg(args)?;
    let trend_months = config.trend_months();
    let from = MonthlyReport::window_start(period, trend_months);
    let rows = ctx.db.fetch_expenses(&user.id, from, period.last_day())?;
    let report = MonthlyReport::build(&rows, period, trend_months);

    println!("Kakeibo report - {}", period.label());
    println!("{}", "─".repeat(40));
    println!("  Total:             {}", ctx.money(report.total));
    println!("  Expenses:          {}", report.count);
    println!("  vs previous month: {}", format_change(report.change_percent));

    println!();
    println!("Weekly breakdown:");
    for week in &report.weeks {
        println!("  {:<8} {:>14}", week.label(), ctx.money(week.total));
    }

    println!();
    println!("Last {} months:", report.trend.len());
    for month in &report.trend {
        let marker = if month.period == period { "*" } else { " " };
        println!(
            " {marker}{:<10} {:>14}  ({} expenses)",
            month.period.label(),
            ctx.money(month.total),
            month.count
        );
    }
    Ok(())
}

fn cli_export(args: &[String], ctx: &Ctx, user: &User) -> Result<()> {
    let period = match args.windows(2).find(|w| w[0] == "--month") {
        Some(w) => parse_month(&w[1], ctx.today.year())?,
        None => YearMonth::from_date(ctx.today),
    };

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| export::shellexpand(a))
        .unwrap_or_else(|| export::default_path(period));

    let expenses = ctx.db.fetch_month_expenses(&user.id, period)?;
    if expenses.is_empty() {
        println!("No expenses for {}", period.label());
        return Ok(());
    }
    let count = export::write_expenses_csv(Path::new(&output_path), &expenses)?;
    println!("Exported {count} expenses to {output_path}");
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
