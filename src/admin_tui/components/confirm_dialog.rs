//! Yes/no popup drawn over the current screen

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::admin_tui::ui::{centered_rect, Styles};

pub struct ConfirmDialog<'a> {
    pub title: &'a str,
    pub prompt: &'a str,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, prompt: &'a str) -> Self {
        Self { title, prompt }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 25, area);
        f.render_widget(Clear, popup);

        let text = vec![
            Line::from(self.prompt.to_string()),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y]", Styles::error()),
                Span::raw(" Delete   "),
                Span::styled("[n]", Styles::info()),
                Span::raw(" Cancel"),
            ]),
        ];

        let dialog = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(self.title.to_string())
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            );

        f.render_widget(dialog, popup);
    }
}
