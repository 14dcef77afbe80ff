//! Main application state and logic for the admin console
//!
//! One event loop owns all state. Each user action awaits its REST call
//! inline; on success the selection clears, the modal closes and the
//! table reloads exactly once.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::api::DictDataApi;
use crate::config::Config;
use crate::models::{ListFilter, ListQuery};
use crate::notify::{Notifier, StatusLine};
use crate::tui::operations;
use crate::tui::screens::{ModalMode, ModalState, RecordsScreen, SearchScreen};
use crate::tui::ui::{centered_rect, Styles};

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Records,
    Search,
}

/// Pending delete awaiting user confirmation
pub struct DeleteConfirm {
    pub dict_codes: Vec<i64>,
    pub message: String,
}

/// Confirmation message naming every target identifier
pub fn delete_prompt(dict_codes: &[i64]) -> String {
    let joined = dict_codes
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Delete dictionary data with code(s) \"{}\"? This cannot be undone.",
        joined
    )
}

/// Main application state
pub struct App<A: DictDataApi, N: Notifier> {
    api: A,
    pub config: Config,
    pub notifier: N,

    pub view: View,
    pub records: RecordsScreen,
    pub search: SearchScreen,
    pub modal: ModalState,
    pub confirm: Option<DeleteConfirm>,

    /// Filter currently applied to the table, forwarded verbatim to the
    /// export endpoint
    pub filter: ListFilter,
    /// dictType -> dictName mapping from the type lookup
    pub type_labels: BTreeMap<String, String>,
    /// Type filter pre-seed from the command line, applied once the
    /// lookup has loaded
    initial_dict_type: Option<String>,

    pub should_quit: bool,
}

impl<A: DictDataApi, N: Notifier> App<A, N> {
    pub fn new(api: A, notifier: N, config: Config, initial_dict_type: Option<String>) -> Self {
        let page_size = config.page_size;
        Self {
            api,
            config,
            notifier,
            view: View::Records,
            records: RecordsScreen::new(page_size),
            search: SearchScreen::new(),
            modal: ModalState::Idle,
            confirm: None,
            filter: ListFilter::default(),
            type_labels: BTreeMap::new(),
            initial_dict_type,
            should_quit: false,
        }
    }

    /// Mount: build the type label lookup, then load the first page.
    /// The lookup is allowed to fail silently; the type filter simply
    /// has no options then.
    pub async fn init(&mut self) {
        match self.api.list_types().await {
            Ok(types) => {
                self.type_labels = types
                    .into_iter()
                    .map(|t| (t.dict_type, t.dict_name))
                    .collect();
                self.search.set_type_options(&self.type_labels);
                if let Some(dict_type) = self.initial_dict_type.take() {
                    self.search.preselect_type(&dict_type);
                    if let Ok(filter) = self.search.build_filter() {
                        self.filter = filter;
                    }
                }
            }
            Err(e) => {
                debug!("Dictionary type lookup failed, type filter has no options: {}", e);
            }
        }
        self.reload_table().await;
    }

    /// Fetch the current page. Read failures surface on the status line
    /// only; the stale rows stay visible.
    pub async fn reload_table(&mut self) {
        let query = ListQuery {
            page_num: self.records.page_num,
            page_size: self.records.page_size,
            filter: self.filter.clone(),
        };
        match self.api.list(&query).await {
            Ok(page) => self.records.set_page(page),
            Err(e) => {
                warn!("Table reload failed: {}", e);
                self.notifier
                    .failure(&format!("Failed to load dictionary data: {}", e));
            }
        }
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Confirmation dialog captures all input while visible
        if self.confirm.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete().await,
                KeyCode::Char('n') | KeyCode::Esc => self.confirm = None,
                _ => {}
            }
            return Ok(());
        }

        if self.modal.is_open() {
            match key.code {
                KeyCode::Esc => self.cancel_modal(),
                KeyCode::Enter => self.submit_modal().await,
                _ => {
                    if let ModalState::Open { form, .. } = &mut self.modal {
                        form.handle_key(key);
                    }
                }
            }
            return Ok(());
        }

        match self.view {
            View::Records => self.handle_records_key(key).await,
            View::Search => {
                match key.code {
                    KeyCode::Esc => self.view = View::Records,
                    _ => {
                        if self.search.handle_key(key) {
                            self.apply_search().await;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    async fn handle_records_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.records.navigate_up(),
            KeyCode::Down => self.records.navigate_down(),
            KeyCode::Left => {
                if self.records.previous_page() {
                    self.reload_table().await;
                }
            }
            KeyCode::Right => {
                if self.records.next_page() {
                    self.reload_table().await;
                }
            }
            KeyCode::Char(' ') => self.records.toggle_selection(),
            KeyCode::Char('a') => self.open_add_modal(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_modal(),
            KeyCode::Char('d') => {
                match self.records.current_record().and_then(|r| r.dict_code) {
                    Some(code) => self.request_delete(vec![code]),
                    None => self.notifier.failure("No row selected"),
                }
            }
            KeyCode::Char('D') => {
                let codes = self.records.selected_codes.clone();
                if codes.is_empty() {
                    self.notifier.failure("No rows selected for bulk delete");
                } else {
                    self.request_delete(codes);
                }
            }
            KeyCode::Char('x') => {
                self.export_current().await;
            }
            KeyCode::Char('r') => self.reload_table().await,
            KeyCode::Char('c') => {
                operations::refresh_cache(&self.api, &mut self.notifier).await;
            }
            KeyCode::Char('/') => self.view = View::Search,
            _ => {}
        }
        Ok(())
    }

    /// Open the modal in add mode, seeded with the currently selected
    /// dictionary type
    pub fn open_add_modal(&mut self) {
        let dict_type = self.search.selected_type();
        self.modal = ModalState::open_add(dict_type.as_deref());
    }

    /// Open the modal seeded with the row under the cursor
    pub fn open_edit_modal(&mut self) {
        match self.records.current_record().cloned() {
            Some(record) => self.modal = ModalState::open_edit(record),
            None => self.notifier.failure("No row selected"),
        }
    }

    /// Cancel resets all modal state
    pub fn cancel_modal(&mut self) {
        self.modal = ModalState::Idle;
    }

    /// Submit the modal form: create in add mode, merge-and-update in
    /// edit mode. On failure the modal stays open.
    pub async fn submit_modal(&mut self) {
        let (mode, patch, seeded) = match &self.modal {
            ModalState::Open { mode, form } => match form.to_patch() {
                Ok(patch) => (*mode, patch, form.seeded.clone()),
                Err(msg) => {
                    self.notifier.failure(&msg);
                    return;
                }
            },
            ModalState::Idle => return,
        };

        let success = match mode {
            ModalMode::Add => {
                let record = patch.into_record();
                operations::create_record(&self.api, &mut self.notifier, &record).await
            }
            ModalMode::Edit => match seeded {
                Some(base) => {
                    let record = patch.merge_into(&base);
                    operations::update_record(&self.api, &mut self.notifier, &record).await
                }
                None => {
                    self.notifier.failure("Nothing loaded to edit");
                    false
                }
            },
        };

        self.refresh_after(success).await;
    }

    /// Shared post-mutation flow: on success clear the bulk selection,
    /// close the modal and reload the table exactly once
    pub async fn refresh_after(&mut self, success: bool) {
        if !success {
            return;
        }
        self.records.clear_selection();
        self.modal = ModalState::Idle;
        self.reload_table().await;
    }

    /// Stage a delete behind the mandatory confirmation dialog
    pub fn request_delete(&mut self, dict_codes: Vec<i64>) {
        let message = delete_prompt(&dict_codes);
        self.confirm = Some(DeleteConfirm {
            dict_codes,
            message,
        });
    }

    /// Issue the staged delete after the user confirmed
    pub async fn confirm_delete(&mut self) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        let success =
            operations::delete_records(&self.api, &mut self.notifier, &confirm.dict_codes).await;
        self.refresh_after(success).await;
    }

    /// Apply the search form: reset to the first page and reload
    pub async fn apply_search(&mut self) {
        match self.search.build_filter() {
            Ok(filter) => {
                self.filter = filter;
                self.records.page_num = 1;
                self.view = View::Records;
                self.reload_table().await;
            }
            Err(msg) => self.notifier.failure(&msg),
        }
    }

    /// Export the currently applied filter to a spreadsheet file
    pub async fn export_current(&mut self) -> Option<std::path::PathBuf> {
        let download_dir = self.config.download_dir.clone();
        operations::export_records(&self.api, &mut self.notifier, &self.filter, &download_dir)
            .await
    }
}

// Drawing and the event loop are tied to the status-line notifier; the
// view logic above stays generic so tests can record notifications.
impl<A: DictDataApi> App<A, StatusLine> {
    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.init().await;

        loop {
            terminal.draw(|f| self.draw(f))?;

            if let Ok(event) = crossterm::event::read() {
                if let crossterm::event::Event::Key(key) = event {
                    self.handle_key_event(key).await?;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match self.view {
            View::Records => {
                let filter_active = !self.filter.is_empty();
                self.records.draw(f, chunks[0], filter_active);
            }
            View::Search => self.search.draw(f, chunks[0]),
        }

        self.draw_status_bar(f, chunks[1]);

        // Popups render over the content area
        self.modal.draw(f, chunks[0]);
        if let Some(ref confirm) = self.confirm {
            draw_confirm_dialog(f, chunks[0], confirm);
        }
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let (text, style) = if let Some(ref msg) = self.notifier.loading {
            (msg.clone(), Styles::warning())
        } else if let Some(ref err) = self.notifier.error {
            (format!("Error: {}", err), Styles::error())
        } else if let Some(ref msg) = self.notifier.status {
            (msg.clone(), Styles::success())
        } else {
            (
                "Dictionary Data Admin | /: Search | a: Add | x: Export | q: Quit".to_string(),
                Styles::inactive(),
            )
        };

        let status_bar = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(status_bar, area);
    }
}

fn draw_confirm_dialog(f: &mut Frame, area: Rect, confirm: &DeleteConfirm) {
    let popup_area = centered_rect(60, 25, area);
    f.render_widget(Clear, popup_area);

    let body = format!("{}\n\ny: Confirm | n: Cancel", confirm.message);
    let dialog = Paragraph::new(body)
        .style(Styles::default())
        .block(
            Block::default()
                .title("Confirm Deletion")
                .borders(Borders::ALL)
                .border_style(Styles::warning()),
        );
    f.render_widget(dialog, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::{DictDataRecord, DictTypeRecord, Page};
    use async_trait::async_trait;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubState {
        rows: Vec<DictDataRecord>,
        types: Vec<DictTypeRecord>,
        list_calls: Vec<ListQuery>,
        created: Vec<DictDataRecord>,
        updated: Vec<DictDataRecord>,
        deleted: Vec<Vec<i64>>,
        exported: Vec<ListFilter>,
        fail_create: bool,
        fail_update: bool,
        fail_delete: bool,
    }

    #[derive(Default)]
    struct StubApi {
        state: Mutex<StubState>,
    }

    impl StubApi {
        fn with_rows(rows: Vec<DictDataRecord>) -> Self {
            let stub = Self::default();
            stub.state.lock().unwrap().rows = rows;
            stub
        }

        fn rejection() -> ApiError {
            ApiError::Api {
                status_code: 500,
                message: "boom".to_string(),
            }
        }
    }

    #[async_trait]
    impl DictDataApi for StubApi {
        async fn list(&self, query: &ListQuery) -> Result<Page<DictDataRecord>, ApiError> {
            let mut state = self.state.lock().unwrap();
            state.list_calls.push(query.clone());
            Ok(Page {
                rows: state.rows.clone(),
                total: state.rows.len() as u64,
            })
        }

        async fn get(&self, dict_code: i64) -> Result<DictDataRecord, ApiError> {
            let state = self.state.lock().unwrap();
            state
                .rows
                .iter()
                .find(|r| r.dict_code == Some(dict_code))
                .cloned()
                .ok_or(ApiError::Api {
                    status_code: 404,
                    message: "not found".to_string(),
                })
        }

        async fn create(&self, record: &DictDataRecord) -> Result<DictDataRecord, ApiError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_create {
                return Err(Self::rejection());
            }
            state.created.push(record.clone());
            let mut created = record.clone();
            created.dict_code = Some(100);
            Ok(created)
        }

        async fn update(&self, record: &DictDataRecord) -> Result<DictDataRecord, ApiError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_update {
                return Err(Self::rejection());
            }
            state.updated.push(record.clone());
            Ok(record.clone())
        }

        async fn delete(&self, dict_codes: &[i64]) -> Result<(), ApiError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_delete {
                return Err(Self::rejection());
            }
            state.deleted.push(dict_codes.to_vec());
            Ok(())
        }

        async fn refresh_cache(&self) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_types(&self) -> Result<Vec<DictTypeRecord>, ApiError> {
            Ok(self.state.lock().unwrap().types.clone())
        }

        async fn export(&self, filter: &ListFilter) -> Result<Vec<u8>, ApiError> {
            let mut state = self.state.lock().unwrap();
            state.exported.push(filter.clone());
            Ok(b"spreadsheet".to_vec())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Vec<String>,
    }

    impl Notifier for RecordingNotifier {
        fn loading(&mut self, message: &str) {
            self.events.push(format!("loading:{}", message));
        }
        fn dismiss_loading(&mut self) {
            self.events.push("dismiss".to_string());
        }
        fn success(&mut self, message: &str) {
            self.events.push(format!("success:{}", message));
        }
        fn failure(&mut self, message: &str) {
            self.events.push(format!("failure:{}", message));
        }
    }

    fn row(code: i64, label: &str) -> DictDataRecord {
        DictDataRecord {
            dict_code: Some(code),
            dict_type: "sys_status".to_string(),
            dict_label: label.to_string(),
            dict_value: code.to_string(),
            dict_sort: 1,
            remark: Some("seeded".to_string()),
            create_time: Some("2024-01-15 10:00:00".to_string()),
        }
    }

    fn test_app(api: StubApi) -> App<StubApi, RecordingNotifier> {
        let config = Config::from_env().unwrap();
        App::new(api, RecordingNotifier::default(), config, None)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list_call_count(app: &App<StubApi, RecordingNotifier>) -> usize {
        app.api.state.lock().unwrap().list_calls.len()
    }

    #[tokio::test]
    async fn successful_create_closes_modal_and_reloads_once() {
        let mut app = test_app(StubApi::default());
        app.init().await;
        assert_eq!(list_call_count(&app), 1);

        app.modal = ModalState::open_add(None);
        if let ModalState::Open { form, .. } = &mut app.modal {
            form.dict_type.set_value("sys_status");
            form.dict_label.set_value("Active");
            form.dict_value.set_value("1");
        }
        app.submit_modal().await;

        {
            let state = app.api.state.lock().unwrap();
            assert_eq!(state.created.len(), 1);
            let created = &state.created[0];
            assert_eq!(created.dict_code, None);
            assert_eq!(created.dict_type, "sys_status");
            assert_eq!(created.dict_label, "Active");
            assert_eq!(created.dict_value, "1");
        }
        assert!(!app.modal.is_open());
        assert!(app.records.selected_codes.is_empty());
        // exactly one reload after the mutation
        assert_eq!(list_call_count(&app), 2);

        assert_eq!(
            app.notifier.events,
            vec![
                "loading:Creating dictionary data...",
                "dismiss",
                "success:Dictionary data created",
            ]
        );
    }

    #[tokio::test]
    async fn failed_create_keeps_modal_open_without_reload() {
        let app_api = StubApi::default();
        app_api.state.lock().unwrap().fail_create = true;
        let mut app = test_app(app_api);
        app.init().await;

        app.modal = ModalState::open_add(None);
        if let ModalState::Open { form, .. } = &mut app.modal {
            form.dict_type.set_value("sys_status");
            form.dict_label.set_value("Active");
            form.dict_value.set_value("1");
        }
        app.submit_modal().await;

        assert!(app.modal.is_open());
        assert_eq!(list_call_count(&app), 1);
        assert!(app
            .notifier
            .events
            .iter()
            .any(|e| e.starts_with("failure:")));
    }

    #[tokio::test]
    async fn edit_submits_merged_record_with_patch_precedence() {
        let mut app = test_app(StubApi::with_rows(vec![row(7, "Active")]));
        app.init().await;

        app.open_edit_modal();
        if let ModalState::Open { form, .. } = &mut app.modal {
            form.dict_label.set_value("Enabled");
        }
        app.submit_modal().await;

        let state = app.api.state.lock().unwrap();
        assert_eq!(state.updated.len(), 1);
        let updated = &state.updated[0];
        assert_eq!(updated.dict_code, Some(7));
        assert_eq!(updated.dict_label, "Enabled");
        // untouched fields carried over from the loaded row
        assert_eq!(updated.dict_value, "7");
        assert_eq!(updated.remark.as_deref(), Some("seeded"));
    }

    #[tokio::test]
    async fn invalid_form_submits_nothing() {
        let mut app = test_app(StubApi::default());
        app.init().await;

        app.modal = ModalState::open_add(None);
        app.submit_modal().await;

        assert!(app.modal.is_open());
        assert!(app.api.state.lock().unwrap().created.is_empty());
        assert_eq!(list_call_count(&app), 1);
    }

    #[tokio::test]
    async fn bulk_delete_confirms_then_clears_selection() {
        let mut app = test_app(StubApi::with_rows(vec![row(10, "a"), row(11, "b")]));
        app.init().await;

        app.records.toggle_selection();
        app.records.navigate_down();
        app.records.toggle_selection();
        assert_eq!(app.records.selected_codes, vec![10, 11]);

        app.request_delete(app.records.selected_codes.clone());
        let message = app.confirm.as_ref().unwrap().message.clone();
        assert!(message.contains("10, 11"));
        // nothing sent before confirmation
        assert!(app.api.state.lock().unwrap().deleted.is_empty());

        app.handle_key_event(key(KeyCode::Char('y'))).await.unwrap();

        {
            let state = app.api.state.lock().unwrap();
            assert_eq!(state.deleted, vec![vec![10, 11]]);
        }
        assert!(app.records.selected_codes.is_empty());
        assert!(app.confirm.is_none());
        assert_eq!(list_call_count(&app), 2);
    }

    #[tokio::test]
    async fn dismissed_confirmation_sends_no_delete() {
        let mut app = test_app(StubApi::with_rows(vec![row(10, "a")]));
        app.init().await;

        app.request_delete(vec![10]);
        app.handle_key_event(key(KeyCode::Char('n'))).await.unwrap();

        assert!(app.confirm.is_none());
        assert!(app.api.state.lock().unwrap().deleted.is_empty());
        assert_eq!(list_call_count(&app), 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_selection() {
        let app_api = StubApi::with_rows(vec![row(10, "a")]);
        app_api.state.lock().unwrap().fail_delete = true;
        let mut app = test_app(app_api);
        app.init().await;

        app.records.toggle_selection();
        app.request_delete(app.records.selected_codes.clone());
        app.confirm_delete().await;

        assert_eq!(app.records.selected_codes, vec![10]);
        assert_eq!(list_call_count(&app), 1);
    }

    #[tokio::test]
    async fn type_lookup_builds_label_mapping() {
        let app_api = StubApi::default();
        app_api.state.lock().unwrap().types = vec![DictTypeRecord {
            dict_type: "sys_status".to_string(),
            dict_name: "Status".to_string(),
        }];
        let mut app = test_app(app_api);
        app.init().await;

        assert_eq!(
            app.type_labels.get("sys_status").map(String::as_str),
            Some("Status")
        );
        assert_eq!(app.search.type_options.len(), 1);
    }

    #[tokio::test]
    async fn export_forwards_applied_filter_and_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(StubApi::default());
        app.config.download_dir = dir.path().to_path_buf();
        app.filter.dict_type = Some("sys_status".to_string());

        let path = app.export_current().await.unwrap();

        {
            let state = app.api.state.lock().unwrap();
            assert_eq!(state.exported.len(), 1);
            assert_eq!(state.exported[0].dict_type.as_deref(), Some("sys_status"));
        }

        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        let digits = name
            .strip_prefix("data_")
            .and_then(|rest| rest.strip_suffix(".xlsx"))
            .unwrap();
        assert_eq!(digits.len(), 13);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(std::fs::read(&path).unwrap(), b"spreadsheet");
    }

    #[tokio::test]
    async fn apply_search_resets_to_first_page() {
        let mut app = test_app(StubApi::with_rows(vec![row(1, "a")]));
        app.init().await;
        app.records.page_num = 4;

        app.search.dict_label_input.set_value("Active");
        app.apply_search().await;

        assert_eq!(app.records.page_num, 1);
        assert_eq!(app.filter.dict_label.as_deref(), Some("Active"));
        assert_eq!(app.view, View::Records);

        let state = app.api.state.lock().unwrap();
        let last = state.list_calls.last().unwrap();
        assert_eq!(last.page_num, 1);
        assert_eq!(last.filter.dict_label.as_deref(), Some("Active"));
    }

    #[tokio::test]
    async fn cancel_resets_modal_state() {
        let mut app = test_app(StubApi::with_rows(vec![row(7, "Active")]));
        app.init().await;

        app.open_edit_modal();
        assert!(app.modal.is_open());
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(!app.modal.is_open());

        // reopening in add mode starts from an empty record
        app.open_add_modal();
        if let ModalState::Open { mode, form } = &app.modal {
            assert_eq!(*mode, ModalMode::Add);
            assert!(form.seeded.is_none());
            assert!(form.dict_label.is_empty());
        } else {
            panic!("modal should be open");
        }
    }

    #[test]
    fn delete_prompt_names_every_identifier() {
        let prompt = delete_prompt(&[3, 17, 42]);
        assert!(prompt.contains("3, 17, 42"));
    }
}
