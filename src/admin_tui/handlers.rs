//! Reusable key handling composed by the individual screens

use crossterm::event::{KeyCode, KeyEvent};

use super::app::Screen;
use super::traits::{FormHandler, Navigable, ScreenAction};

pub struct CommonKeyHandler;

impl CommonKeyHandler {
    /// Handle navigation keys for list-based screens
    pub fn handle_navigation_keys<T: Navigable>(navigable: &mut T, key: KeyEvent) -> Option<ScreenAction> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                navigable.navigate_up();
                Some(ScreenAction::None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                navigable.navigate_down();
                Some(ScreenAction::None)
            }
            KeyCode::Home => {
                navigable.navigate_to_first();
                Some(ScreenAction::None)
            }
            KeyCode::End => {
                navigable.navigate_to_last();
                Some(ScreenAction::None)
            }
            _ => None,
        }
    }

    /// Handle focus movement and text editing for forms
    pub fn handle_form_keys<T: FormHandler>(form: &mut T, key: KeyEvent) -> Option<ScreenAction> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                form.next_field();
                Some(ScreenAction::None)
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.previous_field();
                Some(ScreenAction::None)
            }
            KeyCode::Char(c) => {
                form.handle_char_input(c);
                Some(ScreenAction::None)
            }
            KeyCode::Backspace => {
                form.handle_backspace();
                Some(ScreenAction::None)
            }
            KeyCode::Delete => {
                form.handle_delete();
                Some(ScreenAction::None)
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Home | KeyCode::End => {
                form.handle_cursor(key);
                Some(ScreenAction::None)
            }
            _ => None,
        }
    }

    /// `q` quits, `Esc` goes to `back`
    pub fn handle_global_keys(key: KeyEvent, back: Option<Screen>) -> Option<ScreenAction> {
        match key.code {
            KeyCode::Char('q') => Some(ScreenAction::Quit),
            KeyCode::Esc => back.map(ScreenAction::NavigateTo),
            _ => None,
        }
    }
}

/// Specialized handler for menu-style screens
pub struct MenuHandler;

impl MenuHandler {
    /// Handle menu shortcuts (character keys, case insensitive)
    pub fn handle_menu_shortcuts(key: KeyEvent, shortcuts: &[(char, ScreenAction)]) -> Option<ScreenAction> {
        if let KeyCode::Char(c) = key.code {
            return shortcuts
                .iter()
                .find(|(shortcut, _)| shortcut.eq_ignore_ascii_case(&c))
                .map(|(_, action)| action.clone());
        }
        None
    }
}
