use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::forms::{ExpenseField, ExpenseForm};
use super::theme;

pub(crate) fn render(f: &mut Frame, app: &App) {
    if !app.is_signed_in() {
        super::screens::login::render(f, f.area(), app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    match app.screen {
        Screen::Home => super::screens::home::render(f, chunks[1], app),
        Screen::Report => super::screens::report::render(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    match app.input_mode {
        InputMode::ExpenseForm => {
            if let Some(form) = &app.expense_form {
                render_expense_form(f, f.area(), form);
            }
        }
        InputMode::BudgetForm => {
            if let Some(form) = &app.budget_form {
                let lines = vec![
                    Line::from(Span::styled(
                        format!(" Monthly budget for {}", form.period.label()),
                        theme::dim_style(),
                    )),
                    Line::from(""),
                    field_line("Amount", &form.amount, true),
                    Line::from(""),
                    Line::from(Span::styled(
                        " 0 means no limit · Enter save · Esc cancel",
                        theme::dim_style(),
                    )),
                ];
                render_popup(f, f.area(), " Set Budget ", lines, 50);
            }
        }
        _ => {}
    }

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let num = i + 1;
            if *s == app.screen {
                Line::from(vec![
                    Span::styled(format!("{num}:"), theme::dim_style()),
                    Span::styled(
                        s.to_string(),
                        Style::default()
                            .fg(theme::ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(Span::styled(format!("{num}:{s}"), theme::dim_style()))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_bg = match app.input_mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
        InputMode::ExpenseForm | InputMode::BudgetForm => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    };
    let mode_style = Style::default()
        .fg(theme::HEADER_BG)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD);

    let email = app.auth.user().map_or("", |u| u.email.as_str());
    let info = format!(
        " {} | {} | {} expenses | {email}",
        app.screen,
        app.period.label(),
        app.expenses.len()
    );

    let right = match app.screen {
        Screen::Home => " a add | e edit | D delete | b budget | H/L month | ? help ",
        Screen::Report => " H/L month | t today | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.chars().count() + info.chars().count() + right.len();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.chars().count() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        _ => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn render_expense_form(f: &mut Frame, area: Rect, form: &ExpenseForm) {
    let title = if form.editing_id.is_some() {
        " Edit Expense "
    } else {
        " Add Expense "
    };
    let lines = vec![
        Line::from(""),
        field_line("Amount", &form.amount, form.focus == ExpenseField::Amount),
        field_line("Date", &form.date, form.focus == ExpenseField::Date),
        field_line(
            "Description",
            &form.description,
            form.focus == ExpenseField::Description,
        ),
        Line::from(""),
        Line::from(Span::styled(
            " Tab next field · Enter save · Esc cancel",
            theme::dim_style(),
        )),
    ];
    render_popup(f, area, title, lines, 60);
}

/// One labelled input row; the focused row shows a cursor block.
pub(crate) fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        theme::dim_style()
    };
    let mut spans = vec![
        Span::styled(format!(" {label:<12}"), label_style),
        Span::styled(value, theme::normal_style()),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(theme::ACCENT)));
    }
    Line::from(spans)
}

/// Centered bordered popup sized to its content.
pub(crate) fn render_popup(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>, width: u16) {
    let popup_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = width.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(title.to_string(), theme::title_style()))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(popup, popup_area);
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let mut help_text = vec![
        Line::from(Span::styled(
            " Kakeibo Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", theme::section_style())),
        Line::from(Span::styled(
            "  j/k or Up/Down   Move cursor           1-2/Tab    Switch screens",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  H/L              Prev/Next month       t          Current month",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  g/G              Top/Bottom            Ctrl-q     Quit",
            theme::normal_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Actions", theme::section_style())),
        Line::from(Span::styled(
            "  a                Add expense           e          Edit selected",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  D                Delete selected       b          Set budget",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  :                Command mode          Esc        Cancel/Back",
            theme::normal_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Commands", theme::section_style())),
    ];

    // Build command list dynamically from COMMANDS registry
    let mut seen = std::collections::HashSet::new();
    let mut cmd_lines: Vec<(&str, &str)> = Vec::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        if name.len() <= 1 {
            continue;
        }
        if seen.insert(cmd.description) {
            cmd_lines.push((name, cmd.description));
        }
    }
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<14} {desc}"),
            theme::normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        theme::dim_style(),
    )));

    render_popup(f, area, " Help ", help_text, 72);
}
