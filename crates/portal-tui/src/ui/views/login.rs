use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, LoginFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

/// Visible width of the input fields
const FIELD_WIDTH: usize = 28;

/// Outer width of the login dialog
const DIALOG_WIDTH: u16 = 52;

/// Left margin of the message block inside the dialog
const MESSAGE_INDENT: u16 = 3;

/// Lines above the message: blank, title, blank, email, password, blank, button
const FORM_HEIGHT: u16 = 7;

/// Render the login screen
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let message = form
        .error()
        .map(|m| (m, styles::error_style()))
        .or_else(|| form.success().map(|m| (m, styles::success_style())));

    // Inner width minus borders and indent
    let message_width = DIALOG_WIDTH.saturating_sub(2 + MESSAGE_INDENT);
    let message_height = message
        .map(|(m, _)| wrapped_line_count(m, message_width as usize) as u16)
        .unwrap_or(0);
    // Blank line before the message, then blank line and hint
    let message_block = if message_height > 0 { message_height + 1 } else { 0 };
    let height = 2 + FORM_HEIGHT + message_block + 2;

    let dialog = centered_rect_fixed(DIALOG_WIDTH, height, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .title(" Employee Portal ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORM_HEIGHT),
            Constraint::Length(message_block),
            Constraint::Length(2),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(form_lines(app)), chunks[0]);
    if let Some((text, style)) = message {
        render_message(frame, text, style, chunks[1]);
    }
    frame.render_widget(Paragraph::new(hint_lines()), chunks[2]);
}

fn form_lines(app: &App) -> Vec<Line<'static>> {
    let form = &app.login;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Employee Login", styles::title_style())),
        Line::from(""),
    ];

    // Email field, scrolled so the cursor stays visible
    let email_focused = app.login_focus == LoginFocus::Email;
    lines.push(field_line(
        "Email:    ",
        &tail(&form.email, FIELD_WIDTH),
        email_focused,
    ));

    // Password field (masked)
    let password_focused = app.login_focus == LoginFocus::Password;
    let masked = "*".repeat(form.password.chars().count().min(FIELD_WIDTH));
    lines.push(field_line("Password: ", &masked, password_focused));

    // Login button
    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let label = if form.is_submitting() {
        " Logging in... "
    } else if button_focused {
        "  ▶ Login ◀   "
    } else {
        "    Login     "
    };
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("                ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    lines
}

/// Error or success message, wrapped below the form
fn render_message(frame: &mut Frame, text: &str, style: Style, area: Rect) {
    let area = Rect {
        x: area.x + MESSAGE_INDENT,
        y: area.y + 1,
        width: area.width.saturating_sub(MESSAGE_INDENT),
        height: area.height.saturating_sub(1),
    };
    let paragraph = Paragraph::new(Span::styled(text.to_string(), style))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn hint_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("   Tab", styles::help_key_style()),
            Span::styled(" next field  ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" login  ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" quit", styles::muted_style()),
        ]),
    ]
}

/// Number of lines `text` occupies when word-wrapped to `width` columns
fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    let mut lines = 0;
    let mut current = 0;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if current > 0 && current + 1 + len <= width {
            current += 1 + len;
            continue;
        }
        // Words longer than a line are broken across lines
        let pieces = len.div_ceil(width).max(1);
        lines += pieces;
        current = len - (pieces - 1) * width;
    }
    lines.max(1)
}

/// Last `max` characters of `s`
fn tail(s: &str, max: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max)).collect()
}
