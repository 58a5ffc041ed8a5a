//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
use tracing::{debug, info};

use super::components::StatusDisplay;
use super::events::{AppEvent, Services};
use super::screens::{EntityFormScreen, EntityListScreen, MainMenuScreen};
use super::traits::{ScreenAction, ScreenView};
use super::ui::{centered_rect, Styles};
use crate::api::{AdminApi, EntityKind};
use crate::forms::{DriverForm, FormMode, TravelForm};
use crate::listing::{DriverRow, TravelRow};

const TICK: Duration = Duration::from_millis(100);
const TOAST_TIMEOUT: Duration = Duration::from_secs(5);

/// Application screens
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    MainMenu,
    List(EntityKind),
    Form(EntityKind, FormMode),
}

/// Main TUI application state
pub struct App {
    services: Services,
    events: UnboundedReceiver<AppEvent>,
    pub current_screen: Screen,
    view: Box<dyn ScreenView>,
    pub status: StatusDisplay,
    pub show_help_popup: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        let (services, events) = Services::new(api);
        Self {
            services,
            events,
            current_screen: Screen::MainMenu,
            view: Box::new(MainMenuScreen::new()),
            status: StatusDisplay::new().with_auto_clear(TOAST_TIMEOUT),
            show_help_popup: false,
            should_quit: false,
        }
    }

    fn build_view(&self, screen: &Screen) -> Box<dyn ScreenView> {
        let services = self.services.clone();
        match screen {
            Screen::MainMenu => Box::new(MainMenuScreen::new()),
            Screen::List(EntityKind::Travel) => Box::new(EntityListScreen::<TravelRow>::new(services)),
            Screen::List(EntityKind::Driver) => Box::new(EntityListScreen::<DriverRow>::new(services)),
            Screen::Form(EntityKind::Travel, mode) => Box::new(EntityFormScreen::<TravelForm>::new(*mode, services)),
            Screen::Form(EntityKind::Driver, mode) => Box::new(EntityFormScreen::<DriverForm>::new(*mode, services)),
        }
    }

    /// Switch screens; results of the old screen's tasks become stale
    pub fn navigate_to(&mut self, screen: Screen) {
        info!("Navigating to {:?}", screen);
        self.view = self.build_view(&screen);
        self.current_screen = screen;
        let action = self.view.on_enter();
        self.apply(action);
    }

    fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::NavigateTo(screen) => {
                self.status.clear();
                self.navigate_to(screen);
            }
            ScreenAction::Redirect(navigation) => {
                info!("Redirecting to {}", navigation.route());
                self.navigate_to(Screen::List(navigation.target));
                self.status.set_success(navigation.toast());
            }
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.status.set_info(message),
            ScreenAction::SetLoading(message) => self.status.set_loading(message),
            ScreenAction::SetError(message) => self.status.set_error(message),
            ScreenAction::ClearMessages => self.status.clear(),
            ScreenAction::None => {}
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.navigate_to(Screen::MainMenu);

        while !self.should_quit {
            if self.status.should_auto_clear() {
                self.status.clear();
            }

            terminal.draw(|f| self.draw(f))?;
            self.drain_events();

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        info!("Leaving admin TUI");
        Ok(())
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_app_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Task channel closed");
                    break;
                }
            }
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TaskFinished { ticket, output } => {
                let action = self.view.on_task_finished(ticket, output);
                self.apply(action);
            }
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Char('?') if !self.view.captures_text() => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return;
            }
            _ => {}
        }

        if !self.show_help_popup {
            let action = self.view.handle_key_event(key);
            self.apply(action);
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.view.draw(f, chunks[0]);

        let title = format!("Travel Admin - {} | F1: Help | Ctrl+C: Quit", self.view.title());
        self.status.render_with_title(f, chunks[1], &title);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 60, area);
        f.render_widget(Clear, popup_area);

        let content = format!(
            "Global Shortcuts:\n\
            Ctrl+C - Quit application\n\
            F1 / ? - Toggle this help\n\n{}",
            self.view.help()
        );
        let help_popup = Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            );

        f.render_widget(help_popup, popup_area);
    }
}
