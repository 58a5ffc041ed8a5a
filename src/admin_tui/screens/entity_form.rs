//! Create/edit screen shared by every entity form

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use crate::admin_tui::{
    app::Screen,
    components::FormField,
    events::{take_output, Services, TaskOutput, Ticket},
    handlers::CommonKeyHandler,
    traits::{FormHandler, ScreenAction, ScreenView},
    ui::Styles,
};
use crate::api::ApiError;
use crate::forms::controller::fetch_entity;
use crate::forms::{driver, travel};
use crate::forms::{
    DriverForm, EntityForm, FormController, FormMode, FormPhase, FormValues, Settled, SubmitStart, TravelForm,
};
use crate::models::TravelType;

const FIELD_HEIGHT: u16 = 3;

/// Which inputs a form shows and in what order
pub trait FormLayout: EntityForm {
    fn fields(mode: FormMode) -> Vec<FormField>;

    /// Hidden fields keep their values but cannot be focused
    fn is_visible(_field: &str, _values: &FormValues) -> bool {
        true
    }
}

pub struct EntityFormScreen<F: FormLayout> {
    services: Services,
    controller: FormController<F>,
    fields: Vec<FormField>,
    /// Position within the visible fields
    focus: usize,
    pending: Option<Ticket>,
}

impl<F: FormLayout> EntityFormScreen<F> {
    pub fn new(mode: FormMode, services: Services) -> Self {
        Self {
            services,
            controller: FormController::new(mode),
            fields: F::fields(mode),
            focus: 0,
            pending: None,
        }
    }

    pub fn controller(&self) -> &FormController<F> {
        &self.controller
    }

    fn visible(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| F::is_visible(field.name, self.controller.values()))
            .map(|(i, _)| i)
            .collect()
    }

    fn focused_index(&self) -> Option<usize> {
        let visible = self.visible();
        visible.get(self.focus.min(visible.len().saturating_sub(1))).copied()
    }

    /// Apply an edit to the focused field's value through the controller
    fn edit_focused(&mut self, edit: impl FnOnce(&mut FormField, &mut String)) {
        let Some(index) = self.focused_index() else {
            return;
        };
        let field = &mut self.fields[index];
        let mut value = self.controller.value(field.name).to_string();
        edit(field, &mut value);
        self.controller.set_value(field.name, value);
    }

    fn reset_cursors(&mut self) {
        for field in &mut self.fields {
            let value = self.controller.value(field.name);
            field.move_cursor_to_end(value);
        }
    }

    fn start(&mut self) -> ScreenAction {
        match self.controller.start_loading() {
            Some(id) => {
                let api = self.services.api.clone();
                let cache = self.services.cache.clone();
                self.pending = Some(
                    self.services
                        .tasks
                        .spawn(async move { fetch_entity::<F>(api.as_ref(), &cache, id).await }),
                );
                ScreenAction::SetLoading(format!("Loading {} #{}...", F::KIND, id))
            }
            None => {
                self.reset_cursors();
                ScreenAction::None
            }
        }
    }

    fn submit(&mut self) -> ScreenAction {
        match self.controller.begin_submit() {
            SubmitStart::Blocked => ScreenAction::None,
            SubmitStart::Invalid(errors) => {
                let visible = self.visible();
                if let Some(pos) = visible
                    .iter()
                    .position(|&i| errors.contains(self.fields[i].name))
                {
                    self.focus = pos;
                }
                ScreenAction::SetError(format!("Please fix {} invalid field(s)", errors.len()))
            }
            SubmitStart::Ready(submission) => {
                let api = self.services.api.clone();
                let cache = self.services.cache.clone();
                self.pending = Some(
                    self.services
                        .tasks
                        .spawn(async move { submission.send(api.as_ref(), &cache).await }),
                );
                ScreenAction::SetLoading(format!("Saving {}...", F::KIND))
            }
        }
    }

    fn back(&self) -> ScreenAction {
        ScreenAction::NavigateTo(Screen::List(F::KIND))
    }

    fn handle_ready_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Esc => return self.back(),
            KeyCode::F(2) => {
                if let Some(index) = self.focused_index() {
                    self.fields[index].toggle_reveal();
                }
                return ScreenAction::None;
            }
            _ => {}
        }

        CommonKeyHandler::handle_form_keys(self, key).unwrap_or(ScreenAction::None)
    }

    fn draw_state_message(&self, f: &mut Frame, area: Rect, text: String, style: ratatui::style::Style) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());
        let paragraph = Paragraph::new(text).style(style).wrap(Wrap { trim: true }).block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_form(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let visible = self.visible();
        let mut constraints: Vec<Constraint> = visible.iter().map(|_| Constraint::Length(FIELD_HEIGHT)).collect();
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let focused = self.focused_index();
        for (slot, &index) in visible.iter().enumerate() {
            let field = &self.fields[index];
            field.render(
                f,
                chunks[slot],
                self.controller.value(field.name),
                focused == Some(index) && self.controller.is_ready(),
                self.controller.field_error(field.name),
            );
        }

        let message_area = chunks[visible.len()];
        if let Some(error) = self.controller.global_error() {
            f.render_widget(Paragraph::new(error.to_string()).style(Styles::error()), message_area);
        } else if self.controller.is_submitting() {
            f.render_widget(Paragraph::new("Saving...").style(Styles::warning()), message_area);
        }

        let hints = Line::from(vec![
            Span::styled("Tab/↑/↓", Styles::info()),
            Span::raw(" move  "),
            Span::styled("←/→", Styles::info()),
            Span::raw(" change option  "),
            Span::styled("Enter", Styles::info()),
            Span::raw(" save  "),
            Span::styled("Esc", Styles::info()),
            Span::raw(" cancel"),
        ]);
        f.render_widget(Paragraph::new(hints), chunks[visible.len() + 1]);
    }
}

impl<F: FormLayout> FormHandler for EntityFormScreen<F> {
    fn get_current_field(&self) -> usize {
        self.focus
    }

    fn set_current_field(&mut self, field: usize) {
        if field < self.get_field_count() {
            self.focus = field;
        }
    }

    fn get_field_count(&self) -> usize {
        self.visible().len()
    }

    fn handle_char_input(&mut self, c: char) {
        self.edit_focused(|field, value| {
            if field.is_choice() {
                if c == ' ' {
                    if let Some(next) = field.cycle(value, true) {
                        *value = next;
                    }
                }
            } else {
                field.insert_char(value, c);
            }
        });
    }

    fn handle_backspace(&mut self) {
        self.edit_focused(|field, value| field.delete_char(value));
    }

    fn handle_delete(&mut self) {
        self.edit_focused(|field, value| field.delete_char_forward(value));
    }

    fn handle_cursor(&mut self, key: KeyEvent) {
        self.edit_focused(|field, value| match key.code {
            KeyCode::Left | KeyCode::Right if field.is_choice() => {
                if let Some(next) = field.cycle(value, key.code == KeyCode::Right) {
                    *value = next;
                }
            }
            KeyCode::Left => field.move_cursor_left(),
            KeyCode::Right => field.move_cursor_right(value),
            KeyCode::Home => field.move_cursor_to_start(),
            KeyCode::End => field.move_cursor_to_end(value),
            _ => {}
        });
    }
}

impl<F: FormLayout> ScreenView for EntityFormScreen<F> {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        match self.controller.phase().clone() {
            FormPhase::Idle | FormPhase::Loading => {
                self.draw_state_message(f, area, "Loading...".to_string(), Styles::inactive())
            }
            FormPhase::NotFound => self.draw_state_message(
                f,
                area,
                format!("{} not found.\n\nPress Esc to go back.", F::KIND.label()),
                Styles::error(),
            ),
            FormPhase::LoadFailed(message) => self.draw_state_message(
                f,
                area,
                format!("{}\n\nPress r to retry or Esc to go back.", message),
                Styles::error(),
            ),
            _ => self.draw_form(f, area),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        match self.controller.phase().clone() {
            FormPhase::Ready => self.handle_ready_key(key),
            FormPhase::LoadFailed(_) if key.code == KeyCode::Char('r') => {
                self.controller = FormController::new(self.controller.mode());
                self.start()
            }
            FormPhase::Submitting => ScreenAction::None,
            _ if key.code == KeyCode::Esc => self.back(),
            _ => ScreenAction::None,
        }
    }

    fn on_enter(&mut self) -> ScreenAction {
        self.start()
    }

    fn on_task_finished(&mut self, ticket: Ticket, output: TaskOutput) -> ScreenAction {
        if self.pending != Some(ticket) {
            debug!("Discarding stale result of task {} on {} form", ticket, F::KIND);
            return ScreenAction::None;
        }
        self.pending = None;

        match self.controller.phase().clone() {
            FormPhase::Loading => {
                let Some(result) = take_output::<Result<F::Entity, ApiError>>(output) else {
                    return ScreenAction::None;
                };
                self.controller.finish_loading(result);
                match self.controller.phase().clone() {
                    FormPhase::NotFound => {
                        ScreenAction::SetError(format!("{} not found", F::KIND.label()))
                    }
                    FormPhase::LoadFailed(message) => ScreenAction::SetError(message),
                    _ => {
                        self.reset_cursors();
                        ScreenAction::ClearMessages
                    }
                }
            }
            FormPhase::Submitting => {
                let Some(result) = take_output::<Result<(), ApiError>>(output) else {
                    return ScreenAction::None;
                };
                match self.controller.settle(result) {
                    Settled::Success(navigation) => ScreenAction::Redirect(navigation),
                    Settled::Failure(message) => ScreenAction::SetError(message),
                }
            }
            _ => ScreenAction::None,
        }
    }

    fn captures_text(&self) -> bool {
        self.controller.is_ready()
    }

    fn title(&self) -> String {
        match self.controller.mode() {
            FormMode::Create => format!("Add {}", F::KIND.label()),
            FormMode::Edit(id) => format!("Edit {} #{}", F::KIND.label(), id),
        }
    }

    fn help(&self) -> &'static str {
        "Form:\n\
        Tab / ↓ - Next field\n\
        Shift+Tab / ↑ - Previous field\n\
        ←/→ or Space - Change option\n\
        F2 - Show or hide password\n\
        Enter - Save\n\
        Esc - Cancel and go back"
    }
}

impl FormLayout for TravelForm {
    fn fields(_mode: FormMode) -> Vec<FormField> {
        use travel::fields;

        let types = TravelType::ALL.iter().map(|t| (t.as_str(), t.label())).collect();
        vec![
            FormField::new(fields::TYPE, "Type").choice(types),
            FormField::new(fields::TITLE, "Title"),
            FormField::new(fields::DESCRIPTION, "Description").with_placeholder("Optional, at least 10 characters"),
            FormField::new(fields::CITY_FROM, "City From"),
            FormField::new(fields::CITY_TO, "City To"),
            FormField::new(fields::PRICE, "Price").with_placeholder("e.g. 500000"),
            FormField::new(fields::DEPARTURE_DATE, "Departure Date").with_placeholder("YYYY-MM-DD"),
            FormField::new(fields::RETURN_DATE, "Return Date").with_placeholder("YYYY-MM-DD (optional)"),
            FormField::new(fields::CAPACITY, "Capacity"),
        ]
    }

    fn is_visible(field: &str, values: &FormValues) -> bool {
        match field {
            travel::fields::CITY_FROM | travel::fields::CITY_TO => TravelForm::shows_cities(values),
            _ => true,
        }
    }
}

impl FormLayout for DriverForm {
    fn fields(mode: FormMode) -> Vec<FormField> {
        use driver::fields;

        let password_hint = if mode.is_create() {
            "At least 8 characters"
        } else {
            "Leave blank to keep current password"
        };
        vec![
            FormField::new(fields::NAME, "Name"),
            FormField::new(fields::EMAIL, "Email").with_placeholder("driver@example.com"),
            FormField::new(fields::PHONE, "Phone"),
            FormField::new(fields::ADDRESS, "Address"),
            FormField::new(fields::PASSWORD, "Password")
                .secret()
                .with_placeholder(password_hint),
            FormField::new(fields::PASSWORD_CONFIRMATION, "Confirm Password").secret(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::events::AppEvent;
    use crate::api::testing::{travel, FakeApi};
    use crate::api::EntityKind;
    use crate::forms::travel::fields;
    use crate::navigation::{Navigation, SuccessReason};
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut EntityFormScreen<TravelForm>, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(press(KeyCode::Char(c)));
        }
    }

    fn focus(screen: &mut EntityFormScreen<TravelForm>, field: &str) {
        let visible = screen.visible();
        let pos = visible
            .iter()
            .position(|&i| screen.fields[i].name == field)
            .unwrap();
        screen.set_current_field(pos);
    }

    async fn deliver(
        screen: &mut EntityFormScreen<TravelForm>,
        events: &mut UnboundedReceiver<AppEvent>,
    ) -> ScreenAction {
        let AppEvent::TaskFinished { ticket, output } = events.recv().await.unwrap();
        screen.on_task_finished(ticket, output)
    }

    #[tokio::test]
    async fn test_create_by_typing() {
        let api = Arc::new(FakeApi::default());
        let (services, mut events) = Services::new(api.clone());
        let mut screen = EntityFormScreen::<TravelForm>::new(FormMode::Create, services);
        assert_eq!(screen.on_enter(), ScreenAction::None);

        focus(&mut screen, fields::TITLE);
        type_text(&mut screen, "Bali Trip");
        focus(&mut screen, fields::PRICE);
        type_text(&mut screen, "500000");
        focus(&mut screen, fields::DEPARTURE_DATE);
        type_text(&mut screen, "2025-01-10");
        focus(&mut screen, fields::CAPACITY);
        screen.handle_key_event(press(KeyCode::Backspace));
        type_text(&mut screen, "4");

        let action = screen.handle_key_event(press(KeyCode::Enter));
        assert!(matches!(action, ScreenAction::SetLoading(_)));
        assert!(screen.controller().is_submitting());
        assert_eq!(screen.handle_key_event(press(KeyCode::Enter)), ScreenAction::None);
        assert_eq!(screen.handle_key_event(press(KeyCode::Esc)), ScreenAction::None);

        assert_eq!(
            deliver(&mut screen, &mut events).await,
            ScreenAction::Redirect(Navigation::to_list(EntityKind::Travel, SuccessReason::Created))
        );
        assert_eq!(api.calls(), vec!["POST /admin/travel"]);
        assert_eq!(api.payloads()[0]["title"], "Bali Trip");
    }

    #[tokio::test]
    async fn test_city_fields_follow_type() {
        let (services, _events) = Services::new(Arc::new(FakeApi::default()));
        let mut screen = EntityFormScreen::<TravelForm>::new(FormMode::Create, services);
        screen.on_enter();
        let tourism_fields = screen.get_field_count();

        focus(&mut screen, fields::TYPE);
        screen.handle_key_event(press(KeyCode::Right));
        assert_eq!(screen.controller().value(fields::TYPE), "inter_city");
        assert_eq!(screen.get_field_count(), tourism_fields + 2);

        screen.handle_key_event(press(KeyCode::Enter));
        assert!(screen.controller().field_error(fields::CITY_FROM).is_some());
    }

    #[tokio::test]
    async fn test_edit_not_found() {
        let api = Arc::new(FakeApi::with_travels(vec![travel(3, "Bali Trip")]));
        let (services, mut events) = Services::new(api);
        let mut screen = EntityFormScreen::<TravelForm>::new(FormMode::Edit(42), services);
        assert!(matches!(screen.on_enter(), ScreenAction::SetLoading(_)));

        let action = deliver(&mut screen, &mut events).await;

        assert_eq!(action, ScreenAction::SetError("Travel not found".to_string()));
        assert_eq!(screen.controller().phase(), &FormPhase::NotFound);
        assert_eq!(
            screen.handle_key_event(press(KeyCode::Esc)),
            ScreenAction::NavigateTo(Screen::List(EntityKind::Travel))
        );
    }

    #[tokio::test]
    async fn test_remote_failure_stays_on_form() {
        let api = Arc::new(FakeApi::with_travels(vec![travel(3, "Bali Trip")]));
        let (services, mut events) = Services::new(api.clone());
        let mut screen = EntityFormScreen::<TravelForm>::new(FormMode::Edit(3), services);
        screen.on_enter();
        assert_eq!(deliver(&mut screen, &mut events).await, ScreenAction::ClearMessages);
        assert_eq!(screen.controller().value(fields::TITLE), "Bali Trip");

        api.fail_next(ApiError::Status {
            status: 422,
            message: Some("The title has already been taken.".to_string()),
        });
        screen.handle_key_event(press(KeyCode::Enter));

        assert_eq!(
            deliver(&mut screen, &mut events).await,
            ScreenAction::SetError("The title has already been taken.".to_string())
        );
        assert!(screen.controller().is_ready());
        assert!(screen.controller().errors().is_empty());
    }

    #[test]
    fn test_driver_passwords_are_masked() {
        let layout = DriverForm::fields(FormMode::Edit(1));
        let secret: Vec<&str> = layout.iter().filter(|f| f.is_secret()).map(|f| f.name).collect();
        assert_eq!(secret, vec!["password", "password_confirmation"]);
    }
}
