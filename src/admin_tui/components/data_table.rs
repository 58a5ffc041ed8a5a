//! Table widget over a rendered [`Grid`]

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::admin_tui::{traits::Navigable, ui::Styles};
use crate::table::Grid;

const MAX_COLUMN_WIDTH: usize = 40;

pub struct DataTable {
    pub title: String,
    pub grid: Grid,
    pub state: TableState,
    /// Shown in place of the body when there are no rows
    pub empty_message: String,
}

impl DataTable {
    pub fn new(title: &str, empty_message: &str) -> Self {
        Self {
            title: title.to_string(),
            grid: Grid::default(),
            state: TableState::default(),
            empty_message: empty_message.to_string(),
        }
    }

    /// Replace the grid, keeping the selection on the same position when possible
    pub fn set_grid(&mut self, grid: Grid) {
        let rows = grid.row_count();
        self.grid = grid;
        let selected = match (self.state.selected(), rows) {
            (_, 0) => None,
            (Some(i), n) => Some(i.min(n - 1)),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }

    fn widths(&self) -> Vec<Constraint> {
        self.grid
            .column_widths()
            .into_iter()
            .map(|w| Constraint::Length(w.min(MAX_COLUMN_WIDTH) as u16))
            .collect()
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title(format!("{} ({})", self.title, self.grid.row_count()))
            .borders(Borders::ALL)
            .border_style(border_style);

        if self.grid.is_empty() {
            let mut lines = vec![self.grid.header.join(" | "), String::new()];
            lines.push(self.empty_message.clone());
            let empty = Paragraph::new(lines.join("\n"))
                .style(Styles::inactive())
                .alignment(Alignment::Left)
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let header = Row::new(self.grid.header.iter().map(|h| Cell::from(h.clone())))
            .style(Styles::header())
            .bottom_margin(1);
        let rows = self
            .grid
            .body
            .iter()
            .map(|cells| Row::new(cells.iter().cloned().map(Cell::from)));

        let table = Table::new(rows, self.widths())
            .header(header)
            .block(block)
            .column_spacing(2)
            .highlight_style(Styles::selected())
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut self.state);
    }
}

impl Navigable for DataTable {
    fn navigate_up(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        self.state.select(Some(if selected == 0 { count - 1 } else { selected - 1 }));
    }

    fn navigate_down(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let selected = self.state.selected().map_or(0, |i| (i + 1) % count);
        self.state.select(Some(selected));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.grid.row_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;

    fn grid(rows: usize) -> Grid {
        Grid {
            header: vec!["No".to_string()],
            body: (1..=rows).map(|i| vec![Span::raw(i.to_string())]).collect(),
        }
    }

    #[test]
    fn test_selection_wraps_and_survives_refresh() {
        let mut table = DataTable::new("Travels", "No travels found.");
        table.set_grid(grid(3));
        assert_eq!(table.get_selected_index(), Some(0));

        table.navigate_up();
        assert_eq!(table.get_selected_index(), Some(2));
        table.navigate_down();
        assert_eq!(table.get_selected_index(), Some(0));

        table.navigate_to_last();
        table.set_grid(grid(2));
        assert_eq!(table.get_selected_index(), Some(1));

        table.set_grid(grid(0));
        assert_eq!(table.get_selected_index(), None);
        table.navigate_down();
        assert_eq!(table.get_selected_index(), None);
    }
}
