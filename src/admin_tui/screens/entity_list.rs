//! List screen shared by travels and drivers

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::debug;

use crate::admin_tui::{
    app::Screen,
    components::{ConfirmDialog, DataTable},
    events::{take_output, Services, TaskOutput, Ticket},
    handlers::CommonKeyHandler,
    traits::{Navigable, ScreenAction, ScreenView},
    ui::Styles,
};
use crate::api::ApiError;
use crate::cache::CacheKey;
use crate::forms::FormMode;
use crate::listing::{load_rows, DeleteConfirmation, EntityListing};
use crate::navigation::Navigation;
use crate::table::render_grid;

pub struct EntityListScreen<L: EntityListing> {
    services: Services,
    table: DataTable,
    rows: Vec<L>,
    pending_load: Option<Ticket>,
    pending_delete: Option<Ticket>,
    confirm: Option<DeleteConfirmation>,
    load_error: Option<String>,
}

impl<L: EntityListing> EntityListScreen<L> {
    pub fn new(services: Services) -> Self {
        let plural = format!("{}s", L::KIND.label());
        Self {
            services,
            table: DataTable::new(&plural, &format!("No {} found.", plural.to_lowercase())),
            rows: Vec::new(),
            pending_load: None,
            pending_delete: None,
            confirm: None,
            load_error: None,
        }
    }

    pub fn rows(&self) -> &[L] {
        &self.rows
    }

    pub fn confirmation(&self) -> Option<&DeleteConfirmation> {
        self.confirm.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    fn selected_row(&self) -> Option<&L> {
        self.table.get_selected_index().and_then(|i| self.rows.get(i))
    }

    fn reload(&mut self) {
        let api = self.services.api.clone();
        let cache = self.services.cache.clone();
        self.load_error = None;
        self.pending_load = Some(
            self.services
                .tasks
                .spawn(async move { load_rows::<L>(api.as_ref(), &cache).await }),
        );
    }

    fn set_rows(&mut self, rows: Vec<L>) {
        self.table.set_grid(render_grid(&L::columns(), &rows));
        self.rows = rows;
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> ScreenAction {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return ScreenAction::None,
        };

        let Some(confirmation) = self.confirm.take() else {
            return ScreenAction::None;
        };
        let label = confirmation.label.clone();

        match confirmation.answer(confirmed) {
            Some(request) => {
                let api = self.services.api.clone();
                let cache = self.services.cache.clone();
                self.pending_delete =
                    Some(self.services.tasks.spawn(async move { request.send(api.as_ref(), &cache).await }));
                ScreenAction::SetLoading(format!("Deleting {} \"{}\"...", L::KIND, label))
            }
            None => ScreenAction::SetStatus("Delete cancelled".to_string()),
        }
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let hints = Line::from(vec![
            Span::styled("n", Styles::info()),
            Span::raw(" new  "),
            Span::styled("e/Enter", Styles::info()),
            Span::raw(" update  "),
            Span::styled("d", Styles::info()),
            Span::raw(" delete  "),
            Span::styled("r", Styles::info()),
            Span::raw(" refresh  "),
            Span::styled("Esc", Styles::info()),
            Span::raw(" menu"),
        ]);
        f.render_widget(Paragraph::new(hints), area);
    }
}

impl<L: EntityListing> ScreenView for EntityListScreen<L> {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        if let Some(error) = &self.load_error {
            let text = format!("Error loading data: {}\n\nPress r to retry.", error);
            f.render_widget(Paragraph::new(text).style(Styles::error()), chunks[0]);
        } else if self.pending_load.is_some() && self.rows.is_empty() {
            f.render_widget(Paragraph::new("Loading...").style(Styles::inactive()), chunks[0]);
        } else {
            self.table.render(f, chunks[0], self.confirm.is_none());
        }
        self.draw_footer(f, chunks[1]);

        if let Some(confirmation) = &self.confirm {
            ConfirmDialog::new("Confirm delete", &confirmation.prompt()).render(f, area);
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        if self.confirm.is_some() {
            return self.handle_confirm_key(key);
        }

        if let Some(action) = CommonKeyHandler::handle_navigation_keys(&mut self.table, key) {
            return action;
        }

        match key.code {
            KeyCode::Char('n') | KeyCode::Char('a') => {
                ScreenAction::NavigateTo(Screen::Form(L::KIND, FormMode::Create))
            }
            KeyCode::Char('e') | KeyCode::Enter => match self.selected_row() {
                Some(row) => ScreenAction::NavigateTo(Screen::Form(L::KIND, FormMode::Edit(row.id()))),
                None => ScreenAction::None,
            },
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.pending_delete.is_some() {
                    return ScreenAction::SetStatus("A delete is already in progress".to_string());
                }
                self.confirm = self.selected_row().map(DeleteConfirmation::for_row);
                ScreenAction::None
            }
            KeyCode::Char('r') => {
                self.services.cache.invalidate(&CacheKey::list(L::KIND));
                self.reload();
                ScreenAction::SetLoading(format!("Refreshing {}s...", L::KIND))
            }
            _ => CommonKeyHandler::handle_global_keys(key, Some(Screen::MainMenu)).unwrap_or(ScreenAction::None),
        }
    }

    fn on_enter(&mut self) -> ScreenAction {
        self.reload();
        ScreenAction::None
    }

    fn on_task_finished(&mut self, ticket: Ticket, output: TaskOutput) -> ScreenAction {
        if self.pending_load == Some(ticket) {
            self.pending_load = None;
            return match take_output::<Result<Vec<L>, ApiError>>(output) {
                Some(Ok(rows)) => {
                    self.set_rows(rows);
                    ScreenAction::None
                }
                Some(Err(err)) => {
                    let message = err.to_string();
                    self.load_error = Some(message.clone());
                    ScreenAction::SetError(format!("Failed to load {}s: {}", L::KIND, message))
                }
                None => ScreenAction::None,
            };
        }

        if self.pending_delete == Some(ticket) {
            self.pending_delete = None;
            return match take_output::<Result<Navigation, String>>(output) {
                Some(Ok(navigation)) => ScreenAction::Redirect(navigation),
                Some(Err(message)) => ScreenAction::SetError(message),
                None => ScreenAction::None,
            };
        }

        debug!("Discarding stale result of task {} on {} list", ticket, L::KIND);
        ScreenAction::None
    }

    fn title(&self) -> String {
        format!("{} List", L::KIND.label())
    }

    fn help(&self) -> &'static str {
        "List:\n\
        ↑/↓ or j/k - Select row\n\
        n - New entry\n\
        e / Enter - Update selected\n\
        d - Delete selected (asks first)\n\
        r - Refresh from the server\n\
        Esc - Back to menu\n\
        q - Quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::events::AppEvent;
    use crate::api::testing::{travel, FakeApi};
    use crate::api::EntityKind;
    use crate::listing::TravelRow;
    use crate::navigation::SuccessReason;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn next_event(
        screen: &mut EntityListScreen<TravelRow>,
        events: &mut UnboundedReceiver<AppEvent>,
    ) -> ScreenAction {
        let AppEvent::TaskFinished { ticket, output } = events.recv().await.unwrap();
        screen.on_task_finished(ticket, output)
    }

    #[tokio::test]
    async fn test_load_then_declined_delete() {
        let api = Arc::new(FakeApi::with_travels(vec![travel(3, "Bali Trip"), travel(4, "Lombok")]));
        let (services, mut events) = Services::new(api.clone());
        let mut screen = EntityListScreen::<TravelRow>::new(services);

        screen.on_enter();
        assert!(screen.is_loading());
        assert_eq!(next_event(&mut screen, &mut events).await, ScreenAction::None);
        assert_eq!(screen.rows().len(), 2);

        screen.handle_key_event(press(KeyCode::Char('d')));
        assert_eq!(
            screen.confirmation().map(|c| c.prompt()),
            Some("Delete travel \"Bali Trip\"?".to_string())
        );
        assert_eq!(
            screen.handle_key_event(press(KeyCode::Char('n'))),
            ScreenAction::SetStatus("Delete cancelled".to_string())
        );
        assert!(screen.confirmation().is_none());
        assert_eq!(screen.rows().len(), 2);
        assert_eq!(api.calls(), vec!["GET /travel"]);
    }

    #[tokio::test]
    async fn test_confirmed_delete_redirects() {
        let api = Arc::new(FakeApi::with_travels(vec![travel(3, "Bali Trip")]));
        let (services, mut events) = Services::new(api.clone());
        let mut screen = EntityListScreen::<TravelRow>::new(services);
        screen.on_enter();
        next_event(&mut screen, &mut events).await;

        screen.handle_key_event(press(KeyCode::Char('d')));
        let action = screen.handle_key_event(press(KeyCode::Char('y')));
        assert!(matches!(action, ScreenAction::SetLoading(_)));

        assert_eq!(
            next_event(&mut screen, &mut events).await,
            ScreenAction::Redirect(Navigation::to_list(EntityKind::Travel, SuccessReason::Deleted))
        );
        assert_eq!(api.calls(), vec!["GET /travel", "DELETE /admin/travel/3"]);
    }

    #[tokio::test]
    async fn test_edit_and_stale_results() {
        let api = Arc::new(FakeApi::with_travels(vec![travel(3, "Bali Trip")]));
        let (services, mut events) = Services::new(api);
        let mut screen = EntityListScreen::<TravelRow>::new(services.clone());
        screen.on_enter();
        next_event(&mut screen, &mut events).await;

        assert_eq!(
            screen.handle_key_event(press(KeyCode::Enter)),
            ScreenAction::NavigateTo(Screen::Form(EntityKind::Travel, FormMode::Edit(3)))
        );

        let foreign = services.tasks.spawn(async { 7u8 });
        let AppEvent::TaskFinished { ticket, output } = events.recv().await.unwrap();
        assert_eq!(ticket, foreign);
        assert_eq!(screen.on_task_finished(ticket, output), ScreenAction::None);
        assert_eq!(screen.rows().len(), 1);
    }
}
