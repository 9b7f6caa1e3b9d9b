//! Keyboard and mouse input handling for the TUI.
//!
//! This module translates terminal events into application state changes,
//! and into activity signals for the inactivity monitor.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};

use portal_core::inactivity::ActivitySignal;
use portal_core::routing::Route;

use crate::app::{App, AppState, LoginFocus, PAGE_SCROLL_SIZE};

/// Map a terminal event to the activity signal it represents, if any
pub fn activity_signal(event: &Event) -> Option<ActivitySignal> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(ActivitySignal::KeyPress),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(ActivitySignal::PointerMove),
            MouseEventKind::Down(_) => Some(ActivitySignal::PointerPress),
            _ => None,
        },
        _ => None,
    }
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle payment confirmation
    if matches!(app.state, AppState::ConfirmingProcess) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_process(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_process(),
            _ => {}
        }
        return Ok(false);
    }

    match app.current_route() {
        Route::Login => handle_login_input(app, key),
        Route::Dashboard => {
            handle_dashboard_input(app, key);
            Ok(false)
        }
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            // Enter in the password field submits, like a web form
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login.email.pop();
            }
            LoginFocus::Password => {
                app.login.password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => app.login.push_email_char(c),
            LoginFocus::Password => app.login.push_password_char(c),
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return;
        }
        KeyCode::Char('r') | KeyCode::Char('u') => {
            app.refresh_payments();
            return;
        }
        KeyCode::Char('l') => {
            app.logout();
            return;
        }
        KeyCode::Char('p') | KeyCode::Enter => {
            app.request_process();
            return;
        }
        _ => {}
    }

    let Some(ref mut dashboard) = app.dashboard else {
        return;
    };
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => dashboard.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => dashboard.select_next(),
        KeyCode::Home | KeyCode::Char('g') => dashboard.select_first(),
        KeyCode::End | KeyCode::Char('G') => dashboard.select_last(),
        KeyCode::PageUp => dashboard.page_up(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => dashboard.page_down(PAGE_SCROLL_SIZE),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent};

    use super::*;

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_key_press_is_activity() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(activity_signal(&event), Some(ActivitySignal::KeyPress));
    }

    #[test]
    fn test_key_release_is_not_activity() {
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(activity_signal(&Event::Key(key)), None);
    }

    #[test]
    fn test_mouse_activity() {
        assert_eq!(
            activity_signal(&mouse(MouseEventKind::Moved)),
            Some(ActivitySignal::PointerMove)
        );
        assert_eq!(
            activity_signal(&mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(ActivitySignal::PointerMove)
        );
        assert_eq!(
            activity_signal(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(ActivitySignal::PointerPress)
        );
        assert_eq!(activity_signal(&mouse(MouseEventKind::ScrollDown)), None);
    }

    #[test]
    fn test_resize_is_not_activity() {
        assert_eq!(activity_signal(&Event::Resize(80, 24)), None);
        assert_eq!(activity_signal(&Event::FocusGained), None);
    }
}
