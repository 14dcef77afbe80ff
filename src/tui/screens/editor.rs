//! Create/edit modal for dictionary data records
//!
//! Modal visibility is an explicit state machine: `Idle` when closed,
//! `Open { mode, form }` while the form is showing. Cancel always
//! returns to `Idle` with nothing retained.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::models::{DictDataRecord, RecordPatch};
use crate::tui::ui::{centered_rect, InputField, Styles};

/// Whether the modal creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Add,
    Edit,
}

/// Modal form fields, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    DictType,
    DictLabel,
    DictValue,
    DictSort,
    Remark,
}

const FORM_FIELDS: [FormField; 5] = [
    FormField::DictType,
    FormField::DictLabel,
    FormField::DictValue,
    FormField::DictSort,
    FormField::Remark,
];

/// Form state while the modal is open
pub struct RecordForm {
    current_field: usize,
    pub dict_type: InputField,
    pub dict_label: InputField,
    pub dict_value: InputField,
    pub dict_sort: InputField,
    pub remark: InputField,
    /// Row the edit flow was seeded from; `None` in add mode
    pub seeded: Option<DictDataRecord>,
}

impl RecordForm {
    fn empty() -> Self {
        let mut form = Self {
            current_field: 0,
            dict_type: InputField::new("Dictionary Type").with_placeholder("e.g., sys_status"),
            dict_label: InputField::new("Label"),
            dict_value: InputField::new("Value"),
            dict_sort: InputField::new("Sort Order").with_placeholder("0"),
            remark: InputField::new("Remark (optional)"),
            seeded: None,
        };
        form.update_focus();
        form
    }

    /// Empty form for the add flow, pre-seeded with the currently
    /// selected dictionary type when the filter has one
    pub fn for_add(dict_type: Option<&str>) -> Self {
        let mut form = Self::empty();
        if let Some(dict_type) = dict_type {
            form.dict_type.set_value(dict_type);
        }
        form
    }

    /// Form seeded with the selected row's values for the edit flow
    pub fn for_edit(record: DictDataRecord) -> Self {
        let mut form = Self::empty();
        form.dict_type.set_value(&record.dict_type);
        form.dict_label.set_value(&record.dict_label);
        form.dict_value.set_value(&record.dict_value);
        form.dict_sort.set_value(&record.dict_sort.to_string());
        if let Some(ref remark) = record.remark {
            form.remark.set_value(remark);
        }
        form.seeded = Some(record);
        form
    }

    fn update_focus(&mut self) {
        let current = FORM_FIELDS[self.current_field];
        self.dict_type.set_focus(current == FormField::DictType);
        self.dict_label.set_focus(current == FormField::DictLabel);
        self.dict_value.set_focus(current == FormField::DictValue);
        self.dict_sort.set_focus(current == FormField::DictSort);
        self.remark.set_focus(current == FormField::Remark);
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FORM_FIELDS.len();
        self.update_focus();
    }

    pub fn previous_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FORM_FIELDS.len() - 1
        } else {
            self.current_field - 1
        };
        self.update_focus();
    }

    fn current_input_mut(&mut self) -> &mut InputField {
        match FORM_FIELDS[self.current_field] {
            FormField::DictType => &mut self.dict_type,
            FormField::DictLabel => &mut self.dict_label,
            FormField::DictValue => &mut self.dict_value,
            FormField::DictSort => &mut self.dict_sort,
            FormField::Remark => &mut self.remark,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.previous_field(),
            KeyCode::Char(c) => self.current_input_mut().insert_char(c),
            KeyCode::Backspace => self.current_input_mut().delete_char(),
            KeyCode::Left => self.current_input_mut().move_cursor_left(),
            KeyCode::Right => self.current_input_mut().move_cursor_right(),
            _ => {}
        }
    }

    /// The dictionary type currently entered in the form
    pub fn current_dict_type(&self) -> Option<String> {
        self.dict_type.as_option()
    }

    /// Validate the form and build the patch to submit
    pub fn to_patch(&self) -> Result<RecordPatch, String> {
        let dict_type = self
            .dict_type
            .as_option()
            .ok_or_else(|| "Dictionary type is required".to_string())?;
        let dict_label = self
            .dict_label
            .as_option()
            .ok_or_else(|| "Label is required".to_string())?;
        let dict_value = self
            .dict_value
            .as_option()
            .ok_or_else(|| "Value is required".to_string())?;

        let dict_sort = match self.dict_sort.as_option() {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| format!("Sort order '{}' is not an integer", raw))?,
            ),
            None => None,
        };

        Ok(RecordPatch {
            dict_type: Some(dict_type),
            dict_label: Some(dict_label),
            dict_value: Some(dict_value),
            dict_sort,
            remark: self.remark.as_option(),
        })
    }

    /// Draw the form body inside the modal popup
    fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Dictionary type
                Constraint::Length(3), // Label
                Constraint::Length(3), // Value
                Constraint::Length(3), // Sort order
                Constraint::Length(3), // Remark
                Constraint::Min(0),
            ])
            .split(area);

        self.dict_type.render(f, chunks[0]);
        self.dict_label.render(f, chunks[1]);
        self.dict_value.render(f, chunks[2]);
        self.dict_sort.render(f, chunks[3]);
        self.remark.render(f, chunks[4]);
    }
}

/// Modal controller state
pub enum ModalState {
    Idle,
    Open { mode: ModalMode, form: RecordForm },
}

impl ModalState {
    /// Open the modal in add mode
    pub fn open_add(dict_type: Option<&str>) -> Self {
        ModalState::Open {
            mode: ModalMode::Add,
            form: RecordForm::for_add(dict_type),
        }
    }

    /// Open the modal seeded with the selected row
    pub fn open_edit(record: DictDataRecord) -> Self {
        ModalState::Open {
            mode: ModalMode::Edit,
            form: RecordForm::for_edit(record),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open { .. })
    }

    /// Draw the modal popup over the given area
    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let ModalState::Open { mode, form } = self else {
            return;
        };

        let popup_area = centered_rect(60, 70, area);
        f.render_widget(Clear, popup_area);

        let title = match mode {
            ModalMode::Add => "Add Dictionary Data",
            ModalMode::Edit => "Edit Dictionary Data",
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        form.draw(f, chunks[0]);

        let hint = Paragraph::new("Tab: Next field | Enter: Save | ESC: Cancel")
            .style(Styles::info());
        f.render_widget(hint, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DictDataRecord {
        DictDataRecord {
            dict_code: Some(5),
            dict_type: "sys_status".to_string(),
            dict_label: "Active".to_string(),
            dict_value: "1".to_string(),
            dict_sort: 3,
            remark: None,
            create_time: Some("2024-01-15 10:00:00".to_string()),
        }
    }

    #[test]
    fn test_add_mode_starts_empty_with_seeded_type() {
        let state = ModalState::open_add(Some("sys_status"));
        let ModalState::Open { mode, form } = state else {
            panic!("modal should be open");
        };
        assert_eq!(mode, ModalMode::Add);
        assert!(form.seeded.is_none());
        assert_eq!(form.current_dict_type().as_deref(), Some("sys_status"));
        assert!(form.dict_label.is_empty());
    }

    #[test]
    fn test_edit_mode_seeds_form_from_row() {
        let state = ModalState::open_edit(sample_record());
        let ModalState::Open { mode, form } = state else {
            panic!("modal should be open");
        };
        assert_eq!(mode, ModalMode::Edit);
        assert_eq!(form.dict_label.value, "Active");
        assert_eq!(form.dict_sort.value, "3");
        assert_eq!(form.seeded.as_ref().unwrap().dict_code, Some(5));
    }

    #[test]
    fn test_patch_requires_label() {
        let form = RecordForm::for_add(Some("sys_status"));
        let err = form.to_patch().unwrap_err();
        assert!(err.contains("Label"));
    }

    #[test]
    fn test_patch_rejects_non_numeric_sort() {
        let mut form = RecordForm::for_edit(sample_record());
        form.dict_sort.set_value("high");
        let err = form.to_patch().unwrap_err();
        assert!(err.contains("not an integer"));
    }

    #[test]
    fn test_field_focus_cycles() {
        let mut form = RecordForm::for_add(None);
        for _ in 0..FORM_FIELDS.len() {
            form.next_field();
        }
        assert!(form.dict_type.is_focused);
        form.previous_field();
        assert!(form.remark.is_focused);
    }
}
