//! Main menu screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::admin_tui::{
    app::Screen,
    handlers::{CommonKeyHandler, MenuHandler},
    traits::{Navigable, ScreenAction, ScreenView},
    ui::Styles,
};
use crate::api::EntityKind;
use crate::forms::FormMode;

#[derive(Debug, Clone)]
pub struct MenuOption {
    pub title: String,
    pub description: String,
    pub shortcut: char,
    pub screen: Screen,
}

impl MenuOption {
    pub fn new(title: &str, description: &str, shortcut: char, screen: Screen) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            shortcut,
            screen,
        }
    }
}

pub struct MainMenuScreen {
    pub menu_state: ListState,
    pub menu_options: Vec<MenuOption>,
}

impl Default for MainMenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMenuScreen {
    pub fn new() -> Self {
        let menu_options = vec![
            MenuOption::new(
                "Travels",
                "Browse, edit and delete travel offerings",
                'T',
                Screen::List(EntityKind::Travel),
            ),
            MenuOption::new(
                "Drivers",
                "Browse, edit and delete driver accounts",
                'D',
                Screen::List(EntityKind::Driver),
            ),
            MenuOption::new(
                "Add Travel",
                "Create a new inter city or tourism travel",
                'A',
                Screen::Form(EntityKind::Travel, FormMode::Create),
            ),
            MenuOption::new(
                "Add Driver",
                "Register a new driver account",
                'R',
                Screen::Form(EntityKind::Driver, FormMode::Create),
            ),
        ];

        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            menu_state,
            menu_options,
        }
    }

    fn shortcuts(&self) -> Vec<(char, ScreenAction)> {
        self.menu_options
            .iter()
            .map(|option| (option.shortcut, ScreenAction::NavigateTo(option.screen.clone())))
            .collect()
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let title = Paragraph::new("Travel Admin")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_menu(&mut self, f: &mut Frame, area: Rect) {
        let selected = self.menu_state.selected();
        let items: Vec<ListItem> = self
            .menu_options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let is_selected = Some(i) == selected;
                let style = if is_selected { Styles::selected() } else { Style::default() };

                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("[{}] ", option.shortcut), Styles::info()),
                        Span::styled(option.title.clone(), style.add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(Span::styled(
                        format!("     {}", option.description),
                        if is_selected { style } else { Styles::inactive() },
                    )),
                ])
            })
            .collect();

        let menu = List::new(items)
            .block(
                Block::default()
                    .title("Main Menu")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(menu, area, &mut self.menu_state);
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let instructions = vec![
            Line::from(vec![
                Span::styled("Navigation: ", Styles::info()),
                Span::raw("↑/↓ to move, "),
                Span::styled("Enter", bold),
                Span::raw(" to select"),
            ]),
            Line::from(vec![
                Span::styled("Shortcuts: ", Styles::info()),
                Span::styled("T/D/A/R", bold),
                Span::raw(" for direct access, "),
                Span::styled("q", bold),
                Span::raw(" to quit"),
            ]),
        ];

        let paragraph = Paragraph::new(instructions).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(paragraph, area);
    }
}

impl Navigable for MainMenuScreen {
    fn navigate_up(&mut self) {
        let selected = self.menu_state.selected().unwrap_or(0);
        let count = self.menu_options.len();
        self.menu_state.select(Some(if selected == 0 { count - 1 } else { selected - 1 }));
    }

    fn navigate_down(&mut self) {
        let selected = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some((selected + 1) % self.menu_options.len()));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.menu_state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.menu_state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.menu_options.len()
    }
}

impl ScreenView for MainMenuScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        self.draw_title(f, chunks[0]);
        self.draw_menu(f, chunks[1]);
        self.draw_instructions(f, chunks[2]);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        if key.code == KeyCode::Enter {
            return self
                .get_selected_index()
                .and_then(|i| self.menu_options.get(i))
                .map(|option| ScreenAction::NavigateTo(option.screen.clone()))
                .unwrap_or(ScreenAction::None);
        }

        CommonKeyHandler::handle_navigation_keys(self, key)
            .or_else(|| CommonKeyHandler::handle_global_keys(key, None))
            .or_else(|| MenuHandler::handle_menu_shortcuts(key, &self.shortcuts()))
            .unwrap_or(ScreenAction::None)
    }

    fn title(&self) -> String {
        "Main Menu".to_string()
    }

    fn help(&self) -> &'static str {
        "Main Menu:\n\
        ↑/↓ - Navigate menu\n\
        Enter - Select option\n\
        T - Travels\n\
        D - Drivers\n\
        A - Add travel\n\
        R - Add driver\n\
        q - Quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_menu_navigation_and_shortcuts() {
        let mut menu = MainMenuScreen::new();

        assert_eq!(
            menu.handle_key_event(press(KeyCode::Enter)),
            ScreenAction::NavigateTo(Screen::List(EntityKind::Travel))
        );
        menu.handle_key_event(press(KeyCode::Up));
        assert_eq!(menu.get_selected_index(), Some(3));
        assert_eq!(
            menu.handle_key_event(press(KeyCode::Char('d'))),
            ScreenAction::NavigateTo(Screen::List(EntityKind::Driver))
        );
        assert_eq!(
            menu.handle_key_event(press(KeyCode::Char('a'))),
            ScreenAction::NavigateTo(Screen::Form(EntityKind::Travel, FormMode::Create))
        );
        assert_eq!(menu.handle_key_event(press(KeyCode::Char('q'))), ScreenAction::Quit);
    }
}
