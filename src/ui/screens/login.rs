use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::app::App;
use crate::ui::forms::LoginField;
use crate::ui::render::field_line;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(11),
            Constraint::Min(0),
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(56),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    let form = &app.login;
    let (title, submit) = if form.is_sign_up {
        (" Create Account ", "Enter create account")
    } else {
        (" Sign In ", "Enter sign in")
    };

    if app.auth.is_loading() {
        let msg = Paragraph::new(Line::from(Span::styled("Loading…", theme::dim_style())))
            .centered()
            .block(Block::default().borders(Borders::ALL).border_style(theme::border_style()));
        f.render_widget(msg, cols[1]);
        return;
    }

    let masked = "•".repeat(form.password.chars().count());
    let message = match &form.message {
        Some((text, true)) => Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(theme::RED),
        )),
        Some((text, false)) => Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(theme::GREEN),
        )),
        None => Line::from(""),
    };

    let lines = vec![
        Line::from(Span::styled(
            " Kakeibo household ledger",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field_line("Email", &form.email, form.focus == LoginField::Email),
        field_line("Password", &masked, form.focus == LoginField::Password),
        Line::from(""),
        message,
        Line::from(""),
        Line::from(Span::styled(
            format!(" {submit} · Tab next field · Ctrl-n switch mode"),
            theme::dim_style(),
        )),
        Line::from(Span::styled(" Ctrl-q quit", theme::dim_style())),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(title, theme::title_style())),
    );
    f.render_widget(panel, cols[1]);
}
