//! Core traits for the admin TUI screens

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use super::app::Screen;
use super::events::{TaskOutput, Ticket};
use crate::navigation::Navigation;

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different screen
    NavigateTo(Screen),
    /// A mutation succeeded: go to the entity list and show a toast
    Redirect(Navigation),
    /// Quit the application
    Quit,
    SetStatus(String),
    SetLoading(String),
    SetError(String),
    ClearMessages,
    /// No action taken
    None,
}

/// Behavior shared by every screen
pub trait ScreenView {
    fn draw(&mut self, f: &mut Frame, area: Rect);

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction;

    /// Called once when the screen becomes active
    fn on_enter(&mut self) -> ScreenAction {
        ScreenAction::None
    }

    /// A background task finished; screens ignore tickets they did not issue
    fn on_task_finished(&mut self, _ticket: Ticket, _output: TaskOutput) -> ScreenAction {
        ScreenAction::None
    }

    /// Whether plain character keys are text input on this screen
    fn captures_text(&self) -> bool {
        false
    }

    fn title(&self) -> String;

    fn help(&self) -> &'static str;
}

/// Trait for screens with navigable lists
pub trait Navigable {
    fn navigate_up(&mut self);

    fn navigate_down(&mut self);

    fn get_selected_index(&self) -> Option<usize>;

    fn set_selected_index(&mut self, index: Option<usize>);

    fn get_item_count(&self) -> usize;

    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}

/// Trait for screens with focusable input fields
pub trait FormHandler {
    fn get_current_field(&self) -> usize;

    fn set_current_field(&mut self, field: usize);

    fn get_field_count(&self) -> usize;

    fn next_field(&mut self) {
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field((self.get_current_field() + 1) % total);
        }
    }

    fn previous_field(&mut self) {
        let total = self.get_field_count();
        if total > 0 {
            let current = self.get_current_field();
            self.set_current_field(if current == 0 { total - 1 } else { current - 1 });
        }
    }

    fn handle_char_input(&mut self, c: char);

    fn handle_backspace(&mut self);

    fn handle_delete(&mut self);

    fn handle_cursor(&mut self, key: KeyEvent);
}
