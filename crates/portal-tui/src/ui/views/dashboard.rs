use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use portal_core::models::PaymentRecord;
use portal_core::utils::{format_age, format_countdown, format_optional, truncate_string};
use portal_core::views::Dashboard;

use crate::app::App;
use crate::ui::styles;

const EMPTY_MESSAGE: &str = "No payments found.";

/// Render the payment dashboard
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref dashboard) = app.dashboard else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(1), // Messages
            Constraint::Min(5),    // Payment table
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_title_bar(frame, dashboard, chunks[0]);
    render_messages(frame, dashboard, chunks[1]);
    render_payment_table(frame, dashboard, chunks[2]);
    render_status_bar(frame, app, dashboard, chunks[3]);
}

fn render_title_bar(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let title = format!("  {}", dashboard.welcome());
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + help_hint.len() + 2),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_messages(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let line = if let Some(id) = dashboard.processing() {
        Line::from(Span::styled(
            format!("  Submitting payment {}...", id),
            styles::highlight_style(),
        ))
    } else if let Some(message) = dashboard.success_message() {
        Line::from(Span::styled(format!("  {}", message), styles::success_style()))
    } else if let Some(message) = dashboard.error_message() {
        Line::from(Span::styled(format!("  {}", message), styles::error_style()))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_payment_table(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let block = Block::default()
        .title(format!(" Payments ({}) ", dashboard.payments().len()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if dashboard.payments().is_empty() {
        let text = if dashboard.is_loading() {
            "Loading payments..."
        } else {
            EMPTY_MESSAGE
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            format!(" {}", text),
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header_cells = [
        "ID", "Sender", "Receiver", "Amount", "Currency", "Provider", "SWIFT", "Status", "Created",
    ]
    .into_iter()
    .map(Cell::from);
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = dashboard
        .payments()
        .iter()
        .enumerate()
        .map(|(i, payment)| payment_row(payment, i == dashboard.selection()))
        .collect();

    let widths = [
        Constraint::Length(8),  // ID
        Constraint::Fill(2),    // Sender
        Constraint::Fill(2),    // Receiver
        Constraint::Length(12), // Amount
        Constraint::Length(8),  // Currency
        Constraint::Fill(1),    // Provider
        Constraint::Length(11), // SWIFT
        Constraint::Length(10), // Status
        Constraint::Length(19), // Created
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(dashboard.selection()));

    frame.render_stateful_widget(table, area, &mut state);
}

fn payment_row(payment: &PaymentRecord, selected: bool) -> Row<'static> {
    let placeholder = "-";
    let row_style = if selected {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let status = payment.display_status().to_string();
    let status_style = styles::status_style(&status);

    Row::new(vec![
        Cell::from(truncate_string(payment.id.as_str(), 8)),
        Cell::from(format_optional(&payment.sender_account, placeholder)),
        Cell::from(format_optional(&payment.receiver_account, placeholder)),
        Cell::from(format!("{:>12}", payment.display_amount())),
        Cell::from(format_optional(&payment.currency, placeholder)),
        Cell::from(format_optional(&payment.provider, placeholder)),
        Cell::from(format_optional(&payment.swift_code, placeholder)),
        Cell::from(Span::styled(status, status_style)),
        Cell::from(payment.display_created_at()),
    ])
    .style(row_style)
}

fn render_status_bar(frame: &mut Frame, app: &App, dashboard: &Dashboard, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if let Some(fetched_at) = dashboard.fetched_at() {
        format!(" Updated {} ", format_age(fetched_at, Utc::now()))
    } else {
        " Not yet loaded ".to_string()
    };

    let mut right = vec![];
    if let Some(monitor) = app.monitor() {
        let remaining = monitor.remaining();
        right.push(Span::styled(
            format!(" Idle logout in {} ", format_countdown(remaining)),
            styles::countdown_style(remaining.as_secs()),
        ));
        right.push(Span::styled("| ", styles::muted_style()));
    }
    let shortcuts = "[p]rocess [r]efresh [l]ogout [q]uit ";
    right.push(Span::styled(shortcuts, styles::muted_style()));

    let right_len: usize = right.iter().map(|s| s.content.chars().count()).sum();
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_len);

    let mut spans = vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
    ];
    spans.extend(right);

    let paragraph = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}
