//! Records table screen: one server-side page of dictionary data with
//! row selection for bulk actions

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{DictDataRecord, Page};
use crate::tui::ui::{truncate_pad, Styles};

/// Table screen state
pub struct RecordsScreen {
    pub rows: Vec<DictDataRecord>,
    pub total: u64,
    /// 1-based page number sent to the list endpoint
    pub page_num: u64,
    pub page_size: u64,
    pub row_state: ListState,
    /// Bulk selection, tracked by dictCode
    pub selected_codes: Vec<i64>,
}

impl RecordsScreen {
    pub fn new(page_size: u64) -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            page_num: 1,
            page_size,
            row_state: ListState::default(),
            selected_codes: Vec::new(),
        }
    }

    /// Replace the displayed page after a reload. The cursor resets;
    /// bulk selection survives reloads so multi-page selection works.
    pub fn set_page(&mut self, page: Page<DictDataRecord>) {
        self.rows = page.rows;
        self.total = page.total;
        self.row_state
            .select(if self.rows.is_empty() { None } else { Some(0) });
    }

    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }

    /// Move to the next page if one exists; caller reloads on true
    pub fn next_page(&mut self) -> bool {
        if self.page_num < self.total_pages() {
            self.page_num += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous page if one exists; caller reloads on true
    pub fn previous_page(&mut self) -> bool {
        if self.page_num > 1 {
            self.page_num -= 1;
            true
        } else {
            false
        }
    }

    pub fn navigate_up(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.row_state.selected().unwrap_or(0);
        if current > 0 {
            self.row_state.select(Some(current - 1));
        }
    }

    pub fn navigate_down(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.row_state.selected().unwrap_or(0);
        if current < self.rows.len() - 1 {
            self.row_state.select(Some(current + 1));
        }
    }

    /// Row under the cursor
    pub fn current_record(&self) -> Option<&DictDataRecord> {
        self.row_state.selected().and_then(|i| self.rows.get(i))
    }

    /// Toggle the cursor row in the bulk selection
    pub fn toggle_selection(&mut self) {
        let Some(code) = self.current_record().and_then(|r| r.dict_code) else {
            return;
        };
        if let Some(pos) = self.selected_codes.iter().position(|&c| c == code) {
            self.selected_codes.remove(pos);
        } else {
            self.selected_codes.push(code);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_codes.clear();
    }

    /// Draw the table area (title, rows, pagination/instructions)
    pub fn draw(&mut self, f: &mut Frame, area: Rect, filter_active: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title with totals
                Constraint::Min(0),    // Rows
                Constraint::Length(4), // Instructions and pagination
            ])
            .split(area);

        self.draw_title(f, chunks[0], filter_active);
        self.draw_rows(f, chunks[1]);
        self.draw_bottom_info(f, chunks[2]);
    }

    fn draw_title(&self, f: &mut Frame, area: Rect, filter_active: bool) {
        let mut title = format!("Dictionary Data - {} records", self.total);
        if filter_active {
            title.push_str(" (filtered)");
        }
        if !self.selected_codes.is_empty() {
            title.push_str(&format!(" - {} selected", self.selected_codes.len()));
        }

        let widget = Paragraph::new(title)
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, area);
    }

    fn draw_rows(&mut self, f: &mut Frame, area: Rect) {
        if self.rows.is_empty() {
            let empty = Paragraph::new("No dictionary data found. Press / to adjust the search.")
                .style(Styles::inactive())
                .block(
                    Block::default()
                        .title("Records")
                        .borders(Borders::ALL)
                        .border_style(Styles::inactive_border()),
                );
            f.render_widget(empty, area);
            return;
        }

        let header = ListItem::new(Line::from(vec![
            Span::styled("    ", Styles::title()),
            Span::styled("│ Code   ", Styles::title()),
            Span::styled("│ Type             ", Styles::title()),
            Span::styled("│ Label                ", Styles::title()),
            Span::styled("│ Value        ", Styles::title()),
            Span::styled("│ Sort ", Styles::title()),
            Span::styled("│ Created             ", Styles::title()),
        ]));

        let items: Vec<ListItem> = std::iter::once(header)
            .chain(self.rows.iter().enumerate().map(|(i, record)| {
                let style = if Some(i) == self.row_state.selected() {
                    Styles::selected()
                } else {
                    Style::default()
                };

                let marker = match record.dict_code {
                    Some(code) if self.selected_codes.contains(&code) => "[x]",
                    _ => "[ ]",
                };
                let code = record
                    .dict_code
                    .map(|c| c.to_string())
                    .unwrap_or_default();

                let content = format!(
                    "{} │ {} │ {} │ {} │ {} │ {:4} │ {}",
                    marker,
                    truncate_pad(&code, 6),
                    truncate_pad(&record.dict_type, 16),
                    truncate_pad(&record.dict_label, 20),
                    truncate_pad(&record.dict_value, 12),
                    record.dict_sort,
                    truncate_pad(record.create_time.as_deref().unwrap_or(""), 19),
                );

                ListItem::new(Line::from(Span::styled(content, style)))
            }))
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Records")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );

        f.render_stateful_widget(list, area, &mut self.row_state);
    }

    fn draw_bottom_info(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let instructions = vec![
            Line::from("↑/↓: Navigate | ←/→: Pages | Space: Select | a: Add | e: Edit"),
            Line::from("d: Delete row | D: Delete selected | x: Export | /: Search | q: Quit"),
        ];

        let instructions_widget = Paragraph::new(instructions).style(Styles::info()).block(
            Block::default()
                .title("Actions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(instructions_widget, chunks[0]);

        let pagination_text = if self.total_pages() > 0 {
            format!("Page {} of {}", self.page_num, self.total_pages())
        } else {
            "No pages".to_string()
        };

        let pagination_widget = Paragraph::new(pagination_text).style(Styles::info()).block(
            Block::default()
                .title("Pages")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(pagination_widget, chunks[1]);
    }
}
