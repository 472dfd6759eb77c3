use chrono::Datelike;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::ledger::{self, MonthlySummary, Pace};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_percent, truncate};

/// Rows taken by the budget panel, borders included.
pub(crate) const BUDGET_PANEL_HEIGHT: u16 = 8;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BUDGET_PANEL_HEIGHT),
            Constraint::Min(5),
        ])
        .split(area);

    let summary = app.summary();
    render_budget_panel(f, chunks[0], app, &summary);
    render_expense_table(f, chunks[1], app, &summary);
}

fn render_budget_panel(f: &mut Frame, area: Rect, app: &App, summary: &MonthlySummary) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(
            format!(" ◀ {} ▶ ", app.period.label()),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Budget / spent / remaining
            Constraint::Length(1), // Pace
            Constraint::Length(1),
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Elapsed share of the month
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(totals_line(app, summary)), rows[0]);
    f.render_widget(Paragraph::new(pace_line(app)), rows[1]);

    if summary.has_budget() {
        let ratio = summary.progress_bar_ratio();
        let gauge = Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(theme::budget_color(ratio))
                    .bg(theme::SURFACE),
            )
            .ratio(ratio)
            .label(Span::styled(
                format!("{} of budget", format_percent(summary.progress_percent)),
                Style::default()
                    .fg(theme::TEXT)
                    .add_modifier(Modifier::BOLD),
            ));
        f.render_widget(gauge, rows[3]);
    }

    if app.is_current_month() {
        let elapsed = ledger::elapsed_percent(app.period, app.today);
        let line = Line::from(Span::styled(
            format!(
                " Day {} of {} · {} of the month elapsed",
                app.today.day(),
                app.period.days_in_month(),
                format_percent(elapsed)
            ),
            theme::dim_style(),
        ));
        f.render_widget(Paragraph::new(line), rows[4]);
    }
}

fn totals_line<'a>(app: &App, summary: &MonthlySummary) -> Line<'a> {
    let spent = Span::styled(
        format!("Spent {}", app.money(summary.total_spent)),
        theme::spend_style(),
    );

    if !summary.has_budget() {
        return Line::from(vec![
            Span::styled(" No budget set (press b)   ", theme::dim_style()),
            spent,
        ]);
    }

    let remaining_style = if summary.remaining < Decimal::ZERO {
        Style::default().fg(theme::RED).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::GREEN)
    };
    let mut spans = vec![
        Span::styled(
            format!(" Budget {}   ", app.money(summary.budget_amount)),
            theme::normal_style(),
        ),
        spent,
        Span::raw("   "),
        Span::styled(
            format!("Remaining {}", app.money(summary.remaining)),
            remaining_style,
        ),
    ];
    if summary.is_over_budget() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            " OVER BUDGET ",
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(theme::RED)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn pace_line<'a>(app: &App) -> Line<'a> {
    let Some(report) = app.pace() else {
        return Line::from("");
    };
    let (text, color) = match report.pace {
        Pace::OnPace => ("On pace for the month".to_string(), theme::GREEN),
        Pace::Ahead { excess } => (
            format!(
                "Spending faster than expected ({} ahead of pace)",
                format_points(excess)
            ),
            theme::RED,
        ),
        Pace::Behind { deficit } => (
            format!("Under pace ({} below expected)", format_points(deficit)),
            theme::ACCENT,
        ),
    };
    Line::from(Span::styled(format!(" {text}"), Style::default().fg(color)))
}

fn format_points(val: Decimal) -> String {
    format!("{:.1} pts", val.round_dp(1))
}

fn render_expense_table(f: &mut Frame, area: Rect, app: &App, summary: &MonthlySummary) {
    let title = Span::styled(
        format!(
            " Expenses ({}) · Total {} ",
            summary.expense_count,
            app.money(summary.total_spent)
        ),
        theme::title_style(),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(title);

    if app.expenses.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No expenses for {}", app.period.label()),
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press a to add one, or :add <amount>",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Date", "Description", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let editing_id = app.editing_id();
    let rows: Vec<Row> = app
        .expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, expense)| {
            let style = if editing_id == Some(expense.id.as_str()) {
                theme::editing_style()
            } else if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let description = if expense.description.is_empty() {
                "—".to_string()
            } else {
                truncate(&expense.description, 48)
            };

            Row::new(vec![
                Cell::from(format!("  {}", expense.date.format("%m/%d %a"))),
                Cell::from(description),
                Cell::from(app.money(expense.amount)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
