use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ledger::MonthlyReport;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::format_change;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.report else {
        let msg = Paragraph::new(Line::from(Span::styled(
            "Report unavailable. Press t to reload",
            theme::dim_style(),
        )))
        .centered()
        .block(panel_block(" Report "));
        f.render_widget(msg, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(8),    // Trend
            Constraint::Length(9), // Weekly breakdown
        ])
        .split(area);

    render_cards(f, chunks[0], app, report);
    render_trend(f, chunks[1], app, report);
    render_weeks(f, chunks[2], report);
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(title, theme::title_style()))
}

fn render_cards(f: &mut Frame, area: Rect, app: &App, report: &MonthlyReport) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    // More spending than last month is the bad direction.
    let change_color = if report.change_percent > Decimal::ZERO {
        theme::RED
    } else {
        theme::GREEN
    };

    render_card(
        f,
        cards[0],
        &format!("Total {}", report.period.label()),
        app.money(report.total),
        theme::YELLOW,
    );
    render_card(
        f,
        cards[1],
        "vs Previous Month",
        format_change(report.change_percent),
        change_color,
    );
    render_card(
        f,
        cards[2],
        "Expenses",
        report.count.to_string(),
        theme::ACCENT,
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color) {
    let block_title = format!(" {title} ");
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .centered()
    .block(panel_block(&block_title));
    f.render_widget(text, area);
}

fn render_trend(f: &mut Frame, area: Rect, app: &App, report: &MonthlyReport) {
    let bars: Vec<Bar> = report
        .trend
        .iter()
        .map(|month| {
            let style = if month.period == report.period {
                Style::default().fg(theme::YELLOW)
            } else {
                Style::default().fg(theme::ACCENT)
            };
            Bar::default()
                .value(bar_value(month.total))
                .text_value(compact_amount(month.total))
                .label(Line::from(month.period.short_label()))
                .style(style)
        })
        .collect();

    let bar_width = bar_width(area.width, bars.len());
    let chart_title = format!(
        " Last {} Months ({}) ",
        report.trend.len(),
        app.currency.symbol
    );
    let chart = BarChart::default()
        .block(panel_block(&chart_title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(Style::default().fg(theme::HEADER_BG).bg(theme::ACCENT));

    f.render_widget(chart, area);
}

fn render_weeks(f: &mut Frame, area: Rect, report: &MonthlyReport) {
    let bars: Vec<Bar> = report
        .weeks
        .iter()
        .map(|week| {
            Bar::default()
                .value(bar_value(week.total))
                .text_value(compact_amount(week.total))
                .label(Line::from(week.label()))
                .style(Style::default().fg(theme::GREEN))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel_block(" Weekly Breakdown "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area.width, bars.len()))
        .bar_gap(2)
        .value_style(Style::default().fg(theme::HEADER_BG).bg(theme::GREEN));

    f.render_widget(chart, area);
}

fn bar_value(amount: Decimal) -> u64 {
    amount.round().to_u64().unwrap_or(0)
}

/// Short label for bar values, e.g. `12.3k`.
fn compact_amount(amount: Decimal) -> String {
    let whole = amount.round();
    if whole >= Decimal::from(1_000_000) {
        format!("{:.1}M", whole / Decimal::from(1_000_000))
    } else if whole >= Decimal::from(1_000) {
        format!("{:.1}k", whole / Decimal::from(1_000))
    } else {
        whole.to_string()
    }
}

/// Spread `count` bars over the chart width, leaving room for gaps and borders.
fn bar_width(width: u16, count: usize) -> u16 {
    let count = u16::try_from(count.max(1)).unwrap_or(u16::MAX);
    (width.saturating_sub(2) / count).saturating_sub(1).clamp(3, 12)
}
