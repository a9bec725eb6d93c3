//! Draws the token table with ratatui.

use std::time::Instant;

use pulse_service::models::{
    sorts::{SortColumn, SortConfig, SortDirection},
    tokens::{Token, TokenStatus},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::{
    app::{sort_key_for, WatchApp},
    live_patch::FlashKind,
};

const HELP: &str = "q quit · tab next tab · ←/→ page · r p d w v m sort · shift adds a key · c clear";

/// Header label and the column it sorts, if any.
const HEADERS: [(&str, Option<SortColumn>); 9] = [
    ("", None),
    ("#", Some(SortColumn::Rank)),
    ("SYMBOL", None),
    ("NAME", None),
    ("PRICE", Some(SortColumn::Price)),
    ("24H", Some(SortColumn::Change24h)),
    ("7D", Some(SortColumn::Change7d)),
    ("VOLUME 24H", Some(SortColumn::Volume24h)),
    ("MARKET CAP", Some(SortColumn::MarketCap)),
];

const WIDTHS: [Constraint; 9] = [
    Constraint::Length(1),
    Constraint::Length(8),
    Constraint::Length(8),
    Constraint::Min(12),
    Constraint::Length(18),
    Constraint::Length(11),
    Constraint::Length(11),
    Constraint::Length(19),
    Constraint::Length(21),
];

pub fn flash_style(flash: Option<FlashKind>) -> Style {
    match flash {
        Some(FlashKind::Gain) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Some(FlashKind::Loss) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        None => Style::default(),
    }
}

fn marker(flash: Option<FlashKind>) -> &'static str {
    match flash {
        Some(FlashKind::Gain) => "▲",
        Some(FlashKind::Loss) => "▼",
        None => " ",
    }
}

fn percent(fraction: Decimal) -> String {
    format!("{:+.2}%", (fraction * Decimal::ONE_HUNDRED).round_dp(2))
}

fn change_cell(fraction: Decimal) -> Cell<'static> {
    let color = if fraction.is_sign_negative() && !fraction.is_zero() {
        Color::Red
    } else {
        Color::Green
    };
    Cell::from(percent(fraction)).style(Style::default().fg(color))
}

/// `PRICE (p) ↓2`: shortcut key, direction and position in the sort stack.
fn header_label(label: &str, column: Option<SortColumn>, sort: &SortConfig) -> String {
    let Some(column) = column else {
        return label.to_string();
    };
    let mut text = format!("{} ({})", label, sort_key_for(column));
    let keys = sort.keys();
    if let Some(i) = keys.iter().position(|k| k.column == column) {
        text.push_str(match keys[i].direction {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        });
        if keys.len() > 1 {
            text.push_str(&(i + 1).to_string());
        }
    }
    text
}

fn token_row(token: &Token, flash: Option<FlashKind>) -> Row<'static> {
    Row::new(vec![
        Cell::from(marker(flash)),
        Cell::from(token.rank.to_string()),
        Cell::from(token.symbol.clone()),
        Cell::from(token.name.clone()),
        Cell::from(token.price.normalize().to_string()),
        change_cell(token.change_24h),
        change_cell(token.change_7d),
        Cell::from(token.volume_24h.round_dp(0).to_string()),
        Cell::from(token.market_cap.round_dp(0).to_string()),
    ])
    .style(flash_style(flash))
}

fn title_line(app: &WatchApp) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " PULSE ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for tab in TokenStatus::ALL {
        let style = if tab == app.tab() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", tab), style));
    }
    if let Some(search) = &app.request.search {
        spans.push(Span::styled(
            format!("  search: {}", search),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn footer_line(app: &WatchApp) -> Line<'static> {
    let mut spans = vec![Span::raw(format!(
        " page {} of {} ({} tokens)  ",
        app.request.pagination.page(),
        app.total_pages(),
        app.total
    ))];
    match &app.status {
        Some(error) => spans.push(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )),
        None => spans.push(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    }
    Line::from(spans)
}

fn render_table(frame: &mut Frame, area: Rect, app: &WatchApp, now: Instant) {
    let block = Block::default().borders(Borders::ALL).title(" Tokens ");
    let rows = app.merger.rows();

    if rows.is_empty() {
        let empty = Paragraph::new("no tokens match")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        HEADERS
            .iter()
            .map(|(label, column)| Cell::from(header_label(label, *column, &app.request.sort))),
    )
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows.iter()
            .map(|token| token_row(token, app.merger.flash(&token.id, now))),
        WIDTHS,
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

pub fn render(frame: &mut Frame, app: &WatchApp, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(Paragraph::new(title_line(app)), chunks[0]);
    render_table(frame, chunks[1], app, now);
    frame.render_widget(Paragraph::new(footer_line(app)), chunks[2]);
}
