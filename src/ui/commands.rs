use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use super::app::{App, Screen};
use super::forms::{
    parse_budget_amount, parse_date_token, parse_expense_amount, parse_month, ExpenseInput,
};
use crate::db::Database;
use crate::export;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("home", "Go to Home", cmd_home, r);
    register_command!("report", "Go to Report", cmd_report, r);
    register_command!("r", "Go to Report", cmd_report, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 1200 2024-03-05 lunch)",
        cmd_add,
        r
    );
    register_command!("a", "Add expense (e.g. :a 1200)", cmd_add, r);
    register_command!("edit", "Edit selected expense", cmd_edit, r);
    register_command!("e", "Edit selected expense", cmd_edit, r);
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "budget",
        "Set monthly budget (e.g. :budget 50000, :budget clear)",
        cmd_budget,
        r
    );
    register_command!("b", "Set monthly budget (e.g. :b 50000)", cmd_budget, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!("today", "Go to the current month", cmd_today, r);
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/march.csv)",
        cmd_export,
        r
    );
    register_command!("logout", "Sign out", cmd_logout, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_home(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.screen = Screen::Home;
    Ok(())
}

fn cmd_report(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.screen = Screen::Report;
    Ok(())
}

/// No args opens the form; `<amount> [YYYY-MM-DD] [description…]` adds directly.
fn cmd_add(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.open_add_form();
        return Ok(());
    }

    let mut parts = args.splitn(3, ' ');
    let amount = parts.next().unwrap_or("");
    let mut rest: Vec<&str> = parts.collect();

    let amount = match parse_expense_amount(amount) {
        Ok(amount) => amount,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };
    let date = match rest.first().map(|s| parse_date_token(s)) {
        Some(Ok(Some(date))) => {
            rest.remove(0);
            date
        }
        Some(Err(e)) => {
            app.set_status(e.to_string());
            return Ok(());
        }
        _ if app.is_current_month() => app.today,
        _ => app.period.first_day(),
    };

    let input = ExpenseInput {
        amount,
        date,
        description: rest.join(" ").trim().to_string(),
    };
    app.add_expense(db, &input);
    Ok(())
}

fn cmd_edit(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.screen = Screen::Home;
    app.open_edit_form();
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.screen = Screen::Home;
    app.request_delete();
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    match args {
        "" => app.open_budget_form(),
        "clear" => {
            app.clear_budget(db);
        }
        amount => match parse_budget_amount(amount) {
            Ok(amount) => {
                app.set_budget(db, app.period, amount);
            }
            Err(e) => app.set_status(e.to_string()),
        },
    }
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.go_to_today(db);
        return Ok(());
    }

    match parse_month(args, app.period.year()) {
        Ok(period) => {
            if app.set_period(db, period) {
                app.set_status(format!("Switched to month: {}", period.label()));
            }
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.shift_period(db, 1);
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.shift_period(db, -1);
    Ok(())
}

fn cmd_today(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.go_to_today(db);
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    if app.expenses.is_empty() {
        app.set_status(format!("No expenses for {}", app.period.label()));
        return Ok(());
    }

    let path = if args.is_empty() {
        export::default_path(app.period)
    } else {
        export::shellexpand(args)
    };

    match export::write_expenses_csv(Path::new(&path), &app.expenses) {
        Ok(count) => app.set_status(format!("Exported {count} expenses to {path}")),
        Err(e) => {
            tracing::error!(path, "Export failed: {e:#}");
            app.set_status(format!("Export failed: {e}"));
        }
    }
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.logout(db);
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
