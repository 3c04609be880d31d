//! Input - crossterm events to host actions.
//!
//! Translation is pure so key bindings can be tested without a terminal.
//!
//! | Input                         | Action                 |
//! |-------------------------------|------------------------|
//! | `q`, `Esc`, `Ctrl+C`          | [`HostAction::Quit`]   |
//! | left click                    | [`HostAction::Click`]  |
//! | `Tab` / `Shift+Tab`           | focus next / previous  |
//! | `Enter`, `Space`              | click focused heading  |
//! | `Up`/`Down`, wheel            | scroll one line        |
//! | `PageUp`/`PageDown`           | scroll one page        |
//! | `Home`/`End`                  | jump to top / bottom   |

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Quit,
    Click { row: u16, col: u16 },
    FocusNext,
    FocusPrev,
    /// Click the focused element.
    Activate,
    /// Scroll by lines (negative is up).
    Scroll(i32),
    /// Scroll by viewport pages.
    Page(i32),
    Home,
    End,
    Resize { width: u16, height: u16 },
}

/// Map a terminal event to an action. Unbound input yields `None`.
pub fn translate(event: &Event) -> Option<HostAction> {
    match event {
        Event::Key(key) => translate_key(key),
        Event::Mouse(mouse) => translate_mouse(mouse),
        Event::Resize(width, height) => Some(HostAction::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent) -> Option<HostAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => HostAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => HostAction::Quit,
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => HostAction::FocusPrev,
        KeyCode::Tab => HostAction::FocusNext,
        KeyCode::BackTab => HostAction::FocusPrev,
        KeyCode::Enter | KeyCode::Char(' ') => HostAction::Activate,
        KeyCode::Up | KeyCode::Char('k') => HostAction::Scroll(-1),
        KeyCode::Down | KeyCode::Char('j') => HostAction::Scroll(1),
        KeyCode::PageUp => HostAction::Page(-1),
        KeyCode::PageDown => HostAction::Page(1),
        KeyCode::Home => HostAction::Home,
        KeyCode::End => HostAction::End,
        _ => return None,
    };
    Some(action)
}

fn translate_mouse(mouse: &MouseEvent) -> Option<HostAction> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(HostAction::Click {
            row: mouse.row,
            col: mouse.column,
        }),
        MouseEventKind::ScrollUp => Some(HostAction::Scroll(-1)),
        MouseEventKind::ScrollDown => Some(HostAction::Scroll(1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(translate(&key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(HostAction::Quit));
        assert_eq!(translate(&key(KeyCode::Esc, KeyModifiers::NONE)), Some(HostAction::Quit));
        assert_eq!(translate(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(HostAction::Quit));
        assert_eq!(translate(&key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_focus_keys() {
        assert_eq!(translate(&key(KeyCode::Tab, KeyModifiers::NONE)), Some(HostAction::FocusNext));
        assert_eq!(translate(&key(KeyCode::Tab, KeyModifiers::SHIFT)), Some(HostAction::FocusPrev));
        assert_eq!(translate(&key(KeyCode::BackTab, KeyModifiers::SHIFT)), Some(HostAction::FocusPrev));
        assert_eq!(translate(&key(KeyCode::Enter, KeyModifiers::NONE)), Some(HostAction::Activate));
        assert_eq!(translate(&key(KeyCode::Char(' '), KeyModifiers::NONE)), Some(HostAction::Activate));
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(translate(&key(KeyCode::Down, KeyModifiers::NONE)), Some(HostAction::Scroll(1)));
        assert_eq!(translate(&key(KeyCode::Up, KeyModifiers::NONE)), Some(HostAction::Scroll(-1)));
        assert_eq!(translate(&key(KeyCode::PageDown, KeyModifiers::NONE)), Some(HostAction::Page(1)));
        assert_eq!(translate(&key(KeyCode::Home, KeyModifiers::NONE)), Some(HostAction::Home));
        assert_eq!(translate(&key(KeyCode::End, KeyModifiers::NONE)), Some(HostAction::End));
    }

    #[test]
    fn test_key_release_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(translate(&release), None);
    }

    #[test]
    fn test_mouse_events() {
        assert_eq!(
            translate(&mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            Some(HostAction::Click { row: 7, col: 4 })
        );
        assert_eq!(translate(&mouse(MouseEventKind::Down(MouseButton::Right), 0, 0)), None);
        assert_eq!(translate(&mouse(MouseEventKind::ScrollDown, 0, 0)), Some(HostAction::Scroll(1)));
        assert_eq!(translate(&mouse(MouseEventKind::Moved, 0, 0)), None);
    }

    #[test]
    fn test_resize() {
        assert_eq!(
            translate(&Event::Resize(80, 24)),
            Some(HostAction::Resize { width: 80, height: 24 })
        );
    }
}
