use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::auth::AuthContext;
use crate::config::Config;
use crate::db::Database;
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::screens::home::BUDGET_PANEL_HEIGHT;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &Database, config: &Config, auth: AuthContext) -> Result<()> {
    let mut app = App::new(auth, config);
    if app.is_signed_in() {
        app.reload(db);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("TUI exited with error: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &Database,
) -> Result<()> {
    while app.running {
        app.tick_clock();
        terminal.draw(|f| {
            // tab + status + command bars, budget panel, table borders + header
            let chrome = 3 + BUDGET_PANEL_HEIGHT + 3;
            app.visible_rows = f.area().height.saturating_sub(chrome).max(1) as usize;
            crate::ui::render::render(f, app);
        })?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_quit(&key) {
            app.running = false;
            continue;
        }
        if !app.is_signed_in() {
            handle_login_input(key, app, db);
            continue;
        }
        if app.show_help {
            app.show_help = false;
            continue;
        }
        match app.input_mode {
            InputMode::Normal => handle_normal_input(key, app, db)?,
            InputMode::Command => handle_command_input(key, app, db)?,
            InputMode::ExpenseForm => handle_expense_form_input(key, app, db),
            InputMode::BudgetForm => handle_budget_form_input(key, app, db),
            InputMode::Confirm => handle_confirm_input(key, app, db),
        }
    }
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
}

// ── Input handlers ───────────────────────────────────────────

fn handle_login_input(key: KeyEvent, app: &mut App, db: &Database) {
    let form = &mut app.login;
    match key.code {
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.toggle_mode();
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => form.next_field(),
        KeyCode::Enter => app.submit_login(db),
        KeyCode::Esc => form.message = None,
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(c) => form.focused_mut().push(c),
        _ => {}
    }
}

fn handle_normal_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        KeyCode::Char('G') => scroll_to_bottom(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            app.visible_rows,
        ),
        KeyCode::Char('1') => app.screen = Screen::Home,
        KeyCode::Char('2') => app.screen = Screen::Report,
        KeyCode::Tab | KeyCode::BackTab => {
            app.screen = match app.screen {
                Screen::Home => Screen::Report,
                Screen::Report => Screen::Home,
            };
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app, db)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, db)?,
        KeyCode::Char('t') => commands::handle_command("today", app, db)?,
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('b') => app.open_budget_form(),
        KeyCode::Char('e') | KeyCode::Enter if app.screen == Screen::Home => app.open_edit_form(),
        KeyCode::Char('D') if app.screen == Screen::Home => app.request_delete(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

fn handle_expense_form_input(key: KeyEvent, app: &mut App, db: &Database) {
    let Some(form) = app.expense_form.as_mut() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match key.code {
        KeyCode::Enter => app.submit_expense_form(db),
        KeyCode::Esc => {
            app.close_forms();
            app.set_status("Cancelled");
        }
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(c) => form.focused_mut().push(c),
        _ => {}
    }
}

fn handle_budget_form_input(key: KeyEvent, app: &mut App, db: &Database) {
    let Some(form) = app.budget_form.as_mut() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match key.code {
        KeyCode::Enter => app.submit_budget_form(db),
        KeyCode::Esc => {
            app.close_forms();
            app.set_status("Cancelled");
        }
        KeyCode::Backspace => {
            form.amount.pop();
        }
        KeyCode::Char(c) => form.amount.push(c),
        _ => {}
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, db: &Database) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending(db),
        // Any other key = cancel
        _ => app.cancel_pending(),
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn handle_move_down(app: &mut App) {
    if app.screen == Screen::Home {
        scroll_down(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            app.visible_rows.max(1),
        );
    }
}

fn handle_move_up(app: &mut App) {
    if app.screen == Screen::Home {
        scroll_up(&mut app.expense_index, &mut app.expense_scroll);
    }
}
