//! Search form screen for filtering the records table

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use std::collections::BTreeMap;

use crate::models::ListFilter;
use crate::tui::ui::{centered_rect, InputField, SelectableList, Styles};

/// Search form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    DictType,
    DictLabel,
    DictValue,
    CreatedFrom,
    CreatedTo,
}

const SEARCH_FIELDS: [SearchField; 5] = [
    SearchField::DictType,
    SearchField::DictLabel,
    SearchField::DictValue,
    SearchField::CreatedFrom,
    SearchField::CreatedTo,
];

/// One selectable dictionary type option: key plus human-readable name
#[derive(Debug, Clone)]
pub struct TypeOption {
    pub dict_type: String,
    pub dict_name: String,
}

/// Search screen state
pub struct SearchScreen {
    current_field: usize,
    pub dict_label_input: InputField,
    pub dict_value_input: InputField,
    pub created_from_input: InputField,
    pub created_to_input: InputField,
    /// Type selector options, labelled by dictName from the lookup
    pub type_options: SelectableList<TypeOption>,
    pub show_type_dropdown: bool,
}

impl SearchScreen {
    pub fn new() -> Self {
        let mut screen = Self {
            current_field: 0,
            dict_label_input: InputField::new("Label"),
            dict_value_input: InputField::new("Value"),
            created_from_input: InputField::new("Created From (YYYY-MM-DD)")
                .with_placeholder("2024-01-01"),
            created_to_input: InputField::new("Created To (YYYY-MM-DD)")
                .with_placeholder("2024-12-31"),
            type_options: SelectableList::new(Vec::new()),
            show_type_dropdown: false,
        };
        screen.type_options.select(None);
        screen.update_focus();
        screen
    }

    /// Populate the type selector from the dictType -> dictName lookup.
    /// An earlier selection is kept when its type is still present.
    pub fn set_type_options(&mut self, labels: &BTreeMap<String, String>) {
        let previous = self.selected_type();
        let options = labels
            .iter()
            .map(|(dict_type, dict_name)| TypeOption {
                dict_type: dict_type.clone(),
                dict_name: dict_name.clone(),
            })
            .collect::<Vec<_>>();
        self.type_options.set_items(options);
        self.type_options.select(None);
        if let Some(previous) = previous {
            self.preselect_type(&previous);
        }
    }

    /// Pre-seed the type filter, e.g. from the --dict-type startup
    /// argument. Unknown types select nothing.
    pub fn preselect_type(&mut self, dict_type: &str) {
        let index = self
            .type_options
            .items
            .iter()
            .position(|opt| opt.dict_type == dict_type);
        self.type_options.select(index);
    }

    pub fn selected_type(&self) -> Option<String> {
        self.type_options.selected().map(|opt| opt.dict_type.clone())
    }

    fn update_focus(&mut self) {
        let current = SEARCH_FIELDS[self.current_field];
        self.dict_label_input
            .set_focus(current == SearchField::DictLabel);
        self.dict_value_input
            .set_focus(current == SearchField::DictValue);
        self.created_from_input
            .set_focus(current == SearchField::CreatedFrom);
        self.created_to_input
            .set_focus(current == SearchField::CreatedTo);
    }

    fn current_input_mut(&mut self) -> Option<&mut InputField> {
        match SEARCH_FIELDS[self.current_field] {
            SearchField::DictType => None,
            SearchField::DictLabel => Some(&mut self.dict_label_input),
            SearchField::DictValue => Some(&mut self.dict_value_input),
            SearchField::CreatedFrom => Some(&mut self.created_from_input),
            SearchField::CreatedTo => Some(&mut self.created_to_input),
        }
    }

    /// Handle a key while the form has focus. Returns true when the
    /// form requests submission (Enter outside the dropdown).
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.show_type_dropdown {
            match key.code {
                KeyCode::Up => self.type_options.previous(),
                KeyCode::Down => self.type_options.next(),
                KeyCode::Char(' ') | KeyCode::Delete => self.type_options.select(None),
                KeyCode::Enter | KeyCode::Esc => self.show_type_dropdown = false,
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.current_field = (self.current_field + 1) % SEARCH_FIELDS.len();
                self.update_focus();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.current_field = if self.current_field == 0 {
                    SEARCH_FIELDS.len() - 1
                } else {
                    self.current_field - 1
                };
                self.update_focus();
            }
            KeyCode::Enter => {
                if SEARCH_FIELDS[self.current_field] == SearchField::DictType {
                    self.show_type_dropdown = true;
                } else {
                    return true;
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.current_input_mut() {
                    input.insert_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.current_input_mut() {
                    input.delete_char();
                }
            }
            KeyCode::Left => {
                if let Some(input) = self.current_input_mut() {
                    input.move_cursor_left();
                }
            }
            KeyCode::Right => {
                if let Some(input) = self.current_input_mut() {
                    input.move_cursor_right();
                }
            }
            _ => {}
        }
        false
    }

    /// Validate the form and build the filter to apply
    pub fn build_filter(&self) -> Result<ListFilter, String> {
        let created_from = parse_date_input(&self.created_from_input, "Created From")?;
        let created_to = parse_date_input(&self.created_to_input, "Created To")?;

        Ok(ListFilter {
            dict_type: self.selected_type(),
            dict_label: self.dict_label_input.as_option(),
            dict_value: self.dict_value_input.as_option(),
            created_from,
            created_to,
        })
    }

    pub fn clear(&mut self) {
        self.dict_label_input.clear();
        self.dict_value_input.clear();
        self.created_from_input.clear();
        self.created_to_input.clear();
        self.type_options.select(None);
        self.current_field = 0;
        self.update_focus();
    }

    /// Draw the search form screen
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Type selector
                Constraint::Length(3), // Label
                Constraint::Length(3), // Value
                Constraint::Length(3), // Created from
                Constraint::Length(3), // Created to
                Constraint::Min(0),
                Constraint::Length(4), // Instructions
            ])
            .split(area);

        let title = Paragraph::new("Search Dictionary Data")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        self.draw_type_field(f, chunks[1]);
        self.dict_label_input.render(f, chunks[2]);
        self.dict_value_input.render(f, chunks[3]);
        self.created_from_input.render(f, chunks[4]);
        self.created_to_input.render(f, chunks[5]);

        let instructions = vec![
            Line::from("Tab/Shift+Tab: Navigate fields | Enter: Apply search | ESC: Back"),
            Line::from("Enter on Dictionary Type: choose from lookup | Space in dropdown: Any"),
        ];
        let instructions_widget = Paragraph::new(instructions).style(Styles::info()).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(instructions_widget, chunks[7]);

        if self.show_type_dropdown {
            self.draw_type_dropdown(f, area);
        }
    }

    fn draw_type_field(&self, f: &mut Frame, area: Rect) {
        let selected = self
            .type_options
            .selected()
            .map(|opt| format!("{} ({})", opt.dict_name, opt.dict_type))
            .unwrap_or_else(|| "Any".to_string());

        let style = if SEARCH_FIELDS[self.current_field] == SearchField::DictType {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let field = Paragraph::new(selected).block(
            Block::default()
                .title("Dictionary Type (Enter to select)")
                .borders(Borders::ALL)
                .border_style(style),
        );
        f.render_widget(field, area);
    }

    fn draw_type_dropdown(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 50, area);

        let items: Vec<ListItem> = self
            .type_options
            .items
            .iter()
            .enumerate()
            .map(|(i, opt)| {
                let style = if Some(i) == self.type_options.selected_index() {
                    Styles::selected()
                } else {
                    Style::default()
                };
                let text = format!("{} ({})", opt.dict_name, opt.dict_type);
                ListItem::new(Line::from(Span::styled(text, style)))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Select Dictionary Type")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_widget(Clear, popup_area);
        f.render_stateful_widget(list, popup_area, &mut self.type_options.state);
    }
}

fn parse_date_input(input: &InputField, label: &str) -> Result<Option<NaiveDate>, String> {
    match input.as_option() {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("Invalid '{}' date. Please use YYYY-MM-DD", label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("sys_status".to_string(), "Status".to_string());
        map.insert("sys_yes_no".to_string(), "Yes/No".to_string());
        map
    }

    #[test]
    fn test_type_options_built_from_lookup() {
        let mut screen = SearchScreen::new();
        screen.set_type_options(&labels());
        assert_eq!(screen.type_options.len(), 2);
        // nothing selected by default: filter matches any type
        assert!(screen.selected_type().is_none());
    }

    #[test]
    fn test_preselect_known_and_unknown_type() {
        let mut screen = SearchScreen::new();
        screen.set_type_options(&labels());
        screen.preselect_type("sys_yes_no");
        assert_eq!(screen.selected_type().as_deref(), Some("sys_yes_no"));
        screen.preselect_type("missing_type");
        assert!(screen.selected_type().is_none());
    }

    #[test]
    fn test_build_filter_expands_dates() {
        let mut screen = SearchScreen::new();
        screen.set_type_options(&labels());
        screen.preselect_type("sys_status");
        screen.created_from_input.set_value("2024-01-01");
        screen.created_to_input.set_value("2024-03-31");
        let filter = screen.build_filter().unwrap();
        assert_eq!(filter.dict_type.as_deref(), Some("sys_status"));
        assert_eq!(
            filter.created_from,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(filter.created_to, NaiveDate::from_ymd_opt(2024, 3, 31));
    }

    #[test]
    fn test_build_filter_rejects_bad_date() {
        let mut screen = SearchScreen::new();
        screen.created_from_input.set_value("01/02/2024");
        let err = screen.build_filter().unwrap_err();
        assert!(err.contains("Created From"));
    }

    #[test]
    fn test_empty_form_builds_empty_filter() {
        let screen = SearchScreen::new();
        let filter = screen.build_filter().unwrap();
        assert!(filter.is_empty());
    }
}
