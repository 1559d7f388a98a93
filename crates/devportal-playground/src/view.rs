//! Interactive state and key handling of the playground screen.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use devportal_core::{
    db::SessionStore,
    input::TextInput,
    keybinds::{Action, InputMode, KeyState, process_normal_key},
    picker::{Picker, PickerItem},
    popup::{HelpEntry, WhichKeyEntry},
};
use ratatui::{Frame, layout::Rect};
use zeroize::Zeroize;

use crate::error::PlaygroundError;
use crate::executor::HttpExecutor;
use crate::inspector;
use crate::model::{RowField, RowId};
use crate::presets;
use crate::request::RowList;
use crate::session::Playground;
use crate::ui;

const NOTICE_DURATION: Duration = Duration::from_secs(4);
const HALF_PAGE: usize = 10;
const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

// ── Focus enums ──────────────────────────────────────────────────────

/// Which section of the request panel is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Target,
    Params,
    Headers,
    Body,
    Curl,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Target,
        Section::Params,
        Section::Headers,
        Section::Body,
        Section::Curl,
    ];

    pub fn next(self) -> Self {
        match self {
            Section::Target => Section::Params,
            Section::Params => Section::Headers,
            Section::Headers => Section::Body,
            Section::Body => Section::Curl,
            Section::Curl => Section::Target,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Section::Target => Section::Curl,
            Section::Params => Section::Target,
            Section::Headers => Section::Params,
            Section::Body => Section::Headers,
            Section::Curl => Section::Body,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Target => "URL",
            Section::Params => "Params",
            Section::Headers => "Headers",
            Section::Body => "Body",
            Section::Curl => "curl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    BaseUrl,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTab {
    Body,
    Headers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Params,
    Headers,
}

/// What the insert-mode buffer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    BaseUrl,
    Path,
    Row {
        kind: RowKind,
        id: RowId,
        field: RowField,
    },
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerKind {
    Presets,
    History,
}

/// Transient message shown in the status bar.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    shown_at: Instant,
}

// ── View ─────────────────────────────────────────────────────────────

pub struct PlaygroundView {
    pub(crate) playground: Playground,
    worker: HttpExecutor,
    store: Rc<SessionStore>,
    base_url: String,
    key_state: KeyState,

    pub(crate) focus: PanelFocus,
    pub(crate) section: Section,
    pub(crate) target_field: TargetField,
    pub(crate) params_selected: usize,
    pub(crate) headers_selected: usize,

    /// Set while in insert mode.
    pub(crate) editing: Option<EditTarget>,
    pub(crate) input: TextInput,
    /// Masked credential prompt buffer.
    pub(crate) credential_prompt: Option<TextInput>,

    picker: Picker,
    picker_kind: Option<PickerKind>,

    pub(crate) response_tab: ResponseTab,
    pub(crate) response_scroll: usize,
    pub(crate) body_error: Option<String>,
    pub(crate) notice: Option<Notice>,
    spinner_frame: usize,
    clipboard: Option<arboard::Clipboard>,
}

impl PlaygroundView {
    pub fn new(
        playground: Playground,
        worker: HttpExecutor,
        store: Rc<SessionStore>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            playground,
            worker,
            store,
            base_url: base_url.into(),
            key_state: KeyState::default(),
            focus: PanelFocus::Request,
            section: Section::Target,
            target_field: TargetField::Path,
            params_selected: 0,
            headers_selected: 0,
            editing: None,
            input: TextInput::new(),
            credential_prompt: None,
            picker: Picker::new(),
            picker_kind: None,
            response_tab: ResponseTab::Body,
            response_scroll: 0,
            body_error: None,
            notice: None,
            spinner_frame: 0,
            clipboard: None,
        }
    }

    pub fn name(&self) -> &str {
        "Playground"
    }

    pub fn playground(&self) -> &Playground {
        &self.playground
    }

    pub fn mode(&self) -> InputMode {
        if self.editing.is_some() || self.credential_prompt.is_some() || self.picker.visible {
            InputMode::Insert
        } else {
            InputMode::Normal
        }
    }

    pub fn which_key_entries(&self) -> Vec<WhichKeyEntry> {
        vec![
            WhichKeyEntry::new("s", "Send request"),
            WhichKeyEntry::new("p", "Presets"),
            WhichKeyEntry::new("h", "History"),
            WhichKeyEntry::new("k", "Set API key"),
            WhichKeyEntry::new("K", "Forget API key"),
            WhichKeyEntry::new("c", "Copy as curl"),
            WhichKeyEntry::new("y", "Copy response body"),
            WhichKeyEntry::new("Y", "Copy whole response"),
            WhichKeyEntry::new("f", "Format JSON body"),
            WhichKeyEntry::new("X", "Clear history"),
            WhichKeyEntry::new("r", "Swap panel"),
            WhichKeyEntry::new("?", "Help"),
            WhichKeyEntry::new("q", "Quit"),
        ]
    }

    pub fn help_entries(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::new("Request", "Tab / S-Tab", "Next / previous section"),
            HelpEntry::new("Request", "j / k", "Move between fields and rows"),
            HelpEntry::new("Request", "m / M", "Next / previous method"),
            HelpEntry::new("Request", "i / e / Enter", "Edit field, row or body"),
            HelpEntry::new("Request", "a / o", "Add a row below"),
            HelpEntry::new("Request", "x", "Enable / disable row"),
            HelpEntry::new("Request", "dd", "Delete row (clears body in Body)"),
            HelpEntry::new("Insert", "Tab", "Switch key / value"),
            HelpEntry::new("Insert", "Esc", "Leave insert mode"),
            HelpEntry::new("Response", "j / k", "Scroll"),
            HelpEntry::new("Response", "Tab / Enter", "Body / headers"),
            HelpEntry::new("Global", "Ctrl-s", "Send request"),
            HelpEntry::new("Global", "Ctrl-w", "Swap request / response"),
            HelpEntry::new("Global", "<Space>", "Leader menu"),
            HelpEntry::new("Global", ":reset", "Fresh request, keep API key"),
            HelpEntry::new("Global", ":clear-history", "Empty the history"),
        ]
    }

    /// One-line summary for the status bar.
    pub fn status_info(&self) -> String {
        if let Some(notice) = &self.notice {
            return notice.text.clone();
        }
        let key = match self.playground.vault.masked() {
            Some(masked) => masked,
            None => "no API key".to_string(),
        };
        format!(
            "{} {}  |  {}  |  history {}",
            self.playground.request.method,
            self.playground.request.build_url(),
            key,
            self.playground.history.len()
        )
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn reset_key_state(&mut self) {
        self.key_state.reset();
    }

    /// Poll the worker and expire notices. Called every tick.
    pub fn tick(&mut self) {
        if self.playground.is_in_flight() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
        while let Some(execution) = self.worker.try_recv() {
            self.playground.complete(execution);
            self.response_scroll = 0;
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTICE_DURATION)
        {
            self.notice = None;
        }
    }

    /// Cancel anything in flight. Called once on exit.
    pub fn shutdown(&self) {
        self.worker.shutdown();
    }

    /// Start over with a default request. History is dropped; the API key
    /// survives because it lives in the session store.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        if self.playground.is_in_flight() {
            self.notify_error("Wait for the request in flight to finish");
            return Ok(());
        }
        let descriptors = self.playground.descriptors().to_vec();
        self.playground = Playground::new(self.base_url.clone(), descriptors, self.store.clone())?;
        self.close_credential_prompt();
        self.picker.close();
        self.picker_kind = None;
        self.editing = None;
        self.focus = PanelFocus::Request;
        self.section = Section::Target;
        self.target_field = TargetField::Path;
        self.params_selected = 0;
        self.headers_selected = 0;
        self.response_tab = ResponseTab::Body;
        self.response_scroll = 0;
        self.body_error = None;
        self.notify("Playground reset");
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.playground.clear_history();
        self.notify("History cleared");
    }

    // ── Notices ──────────────────────────────────────────────────────

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(notice = %text, "playground error notice");
        self.notice = Some(Notice {
            text,
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    // ── Key handling ─────────────────────────────────────────────────

    /// Handle a key event. Actions the hub owns (quit, leader menu, command
    /// line, help) are returned; everything else is consumed here.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.picker.visible {
            self.handle_picker_key(key);
            return Action::None;
        }
        if self.credential_prompt.is_some() {
            self.handle_credential_key(key);
            return Action::None;
        }
        if self.editing.is_some() {
            self.handle_insert_key(key);
            return Action::None;
        }
        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        let action = process_normal_key(key, &mut self.key_state);
        match action {
            Action::Quit | Action::LeaderKey | Action::SetMode(_) | Action::Help => return action,
            Action::LeaderSequence(c) => {
                self.handle_leader_action(c);
            }
            Action::Send => self.send(),
            Action::SwapPanel => self.swap_panel(),
            Action::NextMethod => {
                self.playground.request.method = self.playground.request.method.next();
            }
            Action::PrevMethod => {
                self.playground.request.method = self.playground.request.method.prev();
            }
            other => match self.focus {
                PanelFocus::Request => self.handle_request_action(other),
                PanelFocus::Response => self.handle_response_action(other),
            },
        }
        Action::None
    }

    /// Handle a leader chord. Returns true if the key was recognised.
    pub fn handle_leader_action(&mut self, c: char) -> bool {
        match c {
            's' => self.send(),
            'p' => self.open_presets(),
            'h' => self.open_history(),
            'k' => self.open_credential_prompt(),
            'K' => match self.playground.clear_credential() {
                Ok(()) => self.notify("API key forgotten"),
                Err(e) => self.notify_error(format!("{e:#}")),
            },
            'c' => {
                let curl = self.playground.curl();
                self.copy_to_clipboard(curl, "curl command");
            }
            'y' => match self.playground.current_response() {
                Some(record) => {
                    let text = inspector::body_text(record);
                    self.copy_to_clipboard(text, "response body");
                }
                None => self.notify_error("No response to copy"),
            },
            'Y' => match self.playground.current_response() {
                Some(record) => {
                    let text = inspector::record_text(record);
                    self.copy_to_clipboard(text, "response");
                }
                None => self.notify_error("No response to copy"),
            },
            'f' => self.format_body(),
            'X' => self.clear_history(),
            'r' => self.swap_panel(),
            _ => return false,
        }
        true
    }

    fn handle_request_action(&mut self, action: Action) {
        match action {
            Action::NextSection => self.section = self.section.next(),
            Action::PrevSection => self.section = self.section.prev(),
            Action::MoveDown(n) => self.move_selection(n as isize),
            Action::MoveUp(n) => self.move_selection(-(n as isize)),
            Action::HalfPageDown => self.move_selection(HALF_PAGE as isize),
            Action::HalfPageUp => self.move_selection(-(HALF_PAGE as isize)),
            Action::GotoTop => self.move_selection(isize::MIN / 2),
            Action::GotoBottom => self.move_selection(isize::MAX / 2),
            Action::Add => match self.current_row_kind() {
                Some(kind) => self.add_row(kind),
                None => self.edit_current(),
            },
            Action::Edit | Action::Confirm => self.edit_current(),
            Action::Delete => match self.current_row_kind() {
                Some(kind) => self.delete_selected_row(kind),
                None if self.section == Section::Body => {
                    self.playground.request.body.clear();
                    self.body_error = None;
                }
                None => {}
            },
            Action::Toggle => {
                if let Some(kind) = self.current_row_kind()
                    && let Some(id) = self.selected_row_id(kind)
                {
                    self.rows_mut(kind).toggle_row(id);
                }
            }
            _ => {}
        }
    }

    fn handle_response_action(&mut self, action: Action) {
        let total = self.response_line_count();
        match action {
            Action::MoveDown(n) => self.scroll_response(n as isize, total),
            Action::MoveUp(n) => self.scroll_response(-(n as isize), total),
            Action::HalfPageDown => self.scroll_response(HALF_PAGE as isize, total),
            Action::HalfPageUp => self.scroll_response(-(HALF_PAGE as isize), total),
            Action::GotoTop => self.response_scroll = 0,
            Action::GotoBottom => self.response_scroll = total.saturating_sub(1),
            Action::NextSection | Action::PrevSection | Action::Confirm => {
                self.response_tab = match self.response_tab {
                    ResponseTab::Body => ResponseTab::Headers,
                    ResponseTab::Headers => ResponseTab::Body,
                };
                self.response_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        let Some(target) = self.editing else {
            return;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => {
                self.editing = None;
                self.send();
                return;
            }
            KeyCode::Esc => {
                self.editing = None;
                return;
            }
            KeyCode::Enter => match target {
                EditTarget::Body => self.input.insert_char('\n'),
                EditTarget::Row {
                    kind,
                    id,
                    field: RowField::Key,
                } => {
                    self.start_edit(EditTarget::Row {
                        kind,
                        id,
                        field: RowField::Value,
                    });
                    return;
                }
                _ => {
                    self.editing = None;
                    return;
                }
            },
            KeyCode::Tab => {
                if let EditTarget::Row { kind, id, field } = target {
                    let field = match field {
                        RowField::Key => RowField::Value,
                        RowField::Value => RowField::Key,
                    };
                    self.start_edit(EditTarget::Row { kind, id, field });
                } else if target == EditTarget::Body {
                    self.input.insert_str("  ");
                    self.sync_edit();
                }
                return;
            }
            KeyCode::Char('u') if ctrl => self.input.clear(),
            KeyCode::Char(c) => self.input.insert_char(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            _ => return,
        }
        self.sync_edit();
    }

    fn handle_credential_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(buffer) = self.credential_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.close_credential_prompt(),
            KeyCode::Enter => {
                let mut value = buffer.text().to_string();
                self.close_credential_prompt();
                let result = self.playground.set_credential(&value);
                value.zeroize();
                match result {
                    Ok(()) => {
                        let text = match (self.playground.vault.has_credential(), self.playground.matched_descriptor()) {
                            (false, _) => "API key cleared".to_string(),
                            (true, Some(d)) => format!("API key set ({} key {})", d.key_type.label(), d.id),
                            (true, None) => "API key set (not a known key)".to_string(),
                        };
                        self.notify(text);
                    }
                    Err(e) => self.notify_error(format!("{e:#}")),
                }
            }
            KeyCode::Char('u') if ctrl => buffer.clear(),
            KeyCode::Char(c) => buffer.insert_char(c),
            KeyCode::Backspace => buffer.backspace(),
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.picker.close();
                self.picker_kind = None;
            }
            KeyCode::Enter => {
                let selected = self.picker.selected_id().map(str::to_string);
                let kind = self.picker_kind.take();
                self.picker.close();
                if let (Some(id), Some(kind)) = (selected, kind) {
                    self.apply_picker_selection(kind, &id);
                }
            }
            KeyCode::Up | KeyCode::BackTab => self.picker.move_up(),
            KeyCode::Down | KeyCode::Tab => self.picker.move_down(),
            KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => self.picker.move_up(),
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => self.picker.move_down(),
            KeyCode::Char(c) => self.picker.insert_char(c),
            KeyCode::Backspace => self.picker.backspace(),
            _ => {}
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Snapshot the request and hand it to the worker.
    pub fn send(&mut self) {
        match self.playground.begin() {
            Ok(request) => {
                if let Err(e) = self.worker.submit(request) {
                    self.playground.abandon();
                    self.notify_error(format!("{e:#}"));
                    return;
                }
                self.response_scroll = 0;
            }
            Err(err @ PlaygroundError::MissingCredential) => {
                self.notify_error(err.to_string());
                self.open_credential_prompt();
            }
            Err(err @ PlaygroundError::AlreadyInFlight) => self.notify_error(err.to_string()),
        }
    }

    fn swap_panel(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Request => PanelFocus::Response,
            PanelFocus::Response => PanelFocus::Request,
        };
    }

    fn format_body(&mut self) {
        match self.playground.request.format_body() {
            Ok(()) => {
                self.body_error = None;
                self.notify("Body formatted");
            }
            Err(e) => {
                self.body_error = Some(e.to_string());
                self.notify_error(e.to_string());
            }
        }
    }

    fn open_presets(&mut self) {
        let items = presets::all()
            .iter()
            .map(|p| {
                PickerItem::new(
                    p.label,
                    format!("{:<6} {}", p.method.as_str(), p.label),
                    format!("{}  {}", p.path, p.description),
                )
            })
            .collect();
        self.picker.open("Presets", items);
        self.picker_kind = Some(PickerKind::Presets);
    }

    fn open_history(&mut self) {
        if self.playground.history.is_empty() {
            self.notify("History is empty");
            return;
        }
        let items = self
            .playground
            .history
            .iter()
            .map(|e| {
                let status = e.status.map_or_else(|| "ERR".to_string(), |s| s.to_string());
                let duration = e.duration_ms.map_or_else(String::new, |d| format!("{d}ms"));
                PickerItem::new(
                    e.id.to_string(),
                    format!("{:<6} {} {}", e.method.as_str(), status, e.url),
                    format!("{} {}", e.time_label(), duration),
                )
            })
            .collect();
        self.picker.open("History", items);
        self.picker_kind = Some(PickerKind::History);
    }

    fn apply_picker_selection(&mut self, kind: PickerKind, id: &str) {
        match kind {
            PickerKind::Presets => {
                if let Some(preset) = presets::find(id) {
                    self.playground.apply_preset(preset);
                    self.body_error = None;
                    self.notify(format!("Preset: {}", preset.label));
                }
            }
            PickerKind::History => {
                let replayed = id
                    .parse::<u64>()
                    .ok()
                    .is_some_and(|entry_id| self.playground.replay(entry_id));
                if replayed {
                    self.params_selected = 0;
                    self.notify("Request restored from history");
                }
            }
        }
    }

    fn open_credential_prompt(&mut self) {
        self.editing = None;
        self.credential_prompt = Some(TextInput::new());
    }

    fn close_credential_prompt(&mut self) {
        if let Some(buffer) = self.credential_prompt.take() {
            let mut text = buffer.into_text();
            text.zeroize();
        }
    }

    fn copy_to_clipboard(&mut self, text: String, label: &str) {
        if self.clipboard.is_none() {
            self.clipboard = arboard::Clipboard::new().ok();
        }
        let result = match self.clipboard.as_mut() {
            Some(cb) => cb.set_text(text).map_err(|e| e.to_string()),
            None => Err("clipboard unavailable".to_string()),
        };
        match result {
            Ok(()) => self.notify(format!("Copied {label}")),
            Err(e) => self.notify_error(format!("Could not copy {label}: {e}")),
        }
    }

    // ── Editing helpers ──────────────────────────────────────────────

    fn edit_current(&mut self) {
        match self.section {
            Section::Target => {
                let target = match self.target_field {
                    TargetField::BaseUrl => EditTarget::BaseUrl,
                    TargetField::Path => EditTarget::Path,
                };
                self.start_edit(target);
            }
            Section::Params | Section::Headers => {
                let Some(kind) = self.current_row_kind() else {
                    return;
                };
                match self.selected_row_id(kind) {
                    Some(id) => self.start_edit(EditTarget::Row {
                        kind,
                        id,
                        field: RowField::Key,
                    }),
                    None => self.add_row(kind),
                }
            }
            Section::Body => self.start_edit(EditTarget::Body),
            Section::Curl => {
                let curl = self.playground.curl();
                self.copy_to_clipboard(curl, "curl command");
            }
        }
    }

    fn start_edit(&mut self, target: EditTarget) {
        let request = &self.playground.request;
        let text = match target {
            EditTarget::BaseUrl => request.base_url.clone(),
            EditTarget::Path => request.path.clone(),
            EditTarget::Row { kind, id, field } => self
                .rows(kind)
                .get(id)
                .map(|row| match field {
                    RowField::Key => row.key.clone(),
                    RowField::Value => row.value.clone(),
                })
                .unwrap_or_default(),
            EditTarget::Body => request.body.clone(),
        };
        self.input = TextInput::with_text(text);
        self.editing = Some(target);
        if target == EditTarget::Body {
            self.body_error = None;
        }
    }

    /// Write the insert buffer back into whatever it is bound to.
    fn sync_edit(&mut self) {
        let Some(target) = self.editing else {
            return;
        };
        let text = self.input.text().to_string();
        let request = &mut self.playground.request;
        match target {
            EditTarget::BaseUrl => request.base_url = text,
            EditTarget::Path => request.path = text,
            EditTarget::Row { kind, id, field } => {
                self.rows_mut(kind).update_row(id, field, text);
            }
            EditTarget::Body => request.body = text,
        }
    }

    fn add_row(&mut self, kind: RowKind) {
        let index = if self.rows(kind).is_empty() {
            0
        } else {
            *self.selected_mut(kind) + 1
        };
        let id = self.rows_mut(kind).insert_row(index);
        *self.selected_mut(kind) = index;
        self.start_edit(EditTarget::Row {
            kind,
            id,
            field: RowField::Key,
        });
    }

    fn delete_selected_row(&mut self, kind: RowKind) {
        if let Some(id) = self.selected_row_id(kind) {
            self.rows_mut(kind).remove_row(id);
            let len = self.rows(kind).len();
            let sel = self.selected_mut(kind);
            if *sel >= len {
                *sel = len.saturating_sub(1);
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        match self.section {
            Section::Target => {
                self.target_field = if delta > 0 {
                    TargetField::Path
                } else {
                    TargetField::BaseUrl
                };
            }
            Section::Params | Section::Headers => {
                let Some(kind) = self.current_row_kind() else {
                    return;
                };
                let len = self.rows(kind).len();
                if len == 0 {
                    return;
                }
                let sel = self.selected_mut(kind);
                *sel = (*sel as isize)
                    .saturating_add(delta)
                    .clamp(0, len as isize - 1) as usize;
            }
            Section::Body | Section::Curl => {}
        }
    }

    fn current_row_kind(&self) -> Option<RowKind> {
        match self.section {
            Section::Params => Some(RowKind::Params),
            Section::Headers => Some(RowKind::Headers),
            _ => None,
        }
    }

    pub(crate) fn rows(&self, kind: RowKind) -> &RowList {
        match kind {
            RowKind::Params => &self.playground.request.query_params,
            RowKind::Headers => &self.playground.request.headers,
        }
    }

    fn rows_mut(&mut self, kind: RowKind) -> &mut RowList {
        match kind {
            RowKind::Params => &mut self.playground.request.query_params,
            RowKind::Headers => &mut self.playground.request.headers,
        }
    }

    pub(crate) fn selected(&self, kind: RowKind) -> usize {
        match kind {
            RowKind::Params => self.params_selected,
            RowKind::Headers => self.headers_selected,
        }
    }

    fn selected_mut(&mut self, kind: RowKind) -> &mut usize {
        match kind {
            RowKind::Params => &mut self.params_selected,
            RowKind::Headers => &mut self.headers_selected,
        }
    }

    fn selected_row_id(&self, kind: RowKind) -> Option<RowId> {
        self.rows(kind).rows().get(self.selected(kind)).map(|r| r.id)
    }

    fn response_line_count(&self) -> usize {
        match (self.playground.current_response(), self.response_tab) {
            (Some(record), ResponseTab::Body) => inspector::pretty_body(record).lines().count(),
            (Some(record), ResponseTab::Headers) => record.headers.len(),
            (None, _) => 0,
        }
    }

    fn scroll_response(&mut self, delta: isize, total: usize) {
        let max = total.saturating_sub(1) as isize;
        self.response_scroll = (self.response_scroll as isize + delta).clamp(0, max.max(0)) as usize;
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        ui::render_playground(frame, area, self);
        if self.picker.visible {
            self.picker.render(frame, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::executor::{Executor, Transport, TransportResponse};
    use crate::model::HttpMethod;
    use crate::request::OutgoingRequest;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: &OutgoingRequest) -> Result<TransportResponse, TransportError> {
            Ok(TransportResponse {
                status: 200,
                status_text: "OK".into(),
                headers: vec![("content-type".into(), "application/json".into())],
                body: serde_json::json!({ "url": request.url }).to_string(),
            })
        }
    }

    fn view() -> PlaygroundView {
        let store = Rc::new(SessionStore::open().unwrap());
        let playground = Playground::new("https://api.example.com/v1", Vec::new(), store.clone()).unwrap();
        let worker = HttpExecutor::spawn(Executor::new(Arc::new(EchoTransport))).unwrap();
        PlaygroundView::new(playground, worker, store, "https://api.example.com/v1")
    }

    fn press(view: &mut PlaygroundView, code: KeyCode) -> Action {
        view.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(view: &mut PlaygroundView, text: &str) {
        for c in text.chars() {
            press(view, KeyCode::Char(c));
        }
    }

    fn wait_for_response(view: &mut PlaygroundView) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while view.playground.is_in_flight() {
            assert!(Instant::now() < deadline, "no response from worker");
            std::thread::sleep(Duration::from_millis(5));
            view.tick();
        }
    }

    #[test]
    fn test_edit_path_updates_url() {
        let mut v = view();
        press(&mut v, KeyCode::Char('i'));
        assert_eq!(v.mode(), InputMode::Insert);
        press(&mut v, KeyCode::Char('u'));
        type_text(&mut v, "sage");
        press(&mut v, KeyCode::Esc);
        assert_eq!(v.mode(), InputMode::Normal);
        assert_eq!(v.playground.request.build_url(), "https://api.example.com/v1/usage");
    }

    #[test]
    fn test_add_query_param_row() {
        let mut v = view();
        press(&mut v, KeyCode::Tab);
        assert_eq!(v.section, Section::Params);
        press(&mut v, KeyCode::Char('a'));
        type_text(&mut v, "q");
        press(&mut v, KeyCode::Tab);
        type_text(&mut v, "a b");
        press(&mut v, KeyCode::Esc);
        assert_eq!(v.playground.request.build_url(), "https://api.example.com/v1/?q=a%20b");

        press(&mut v, KeyCode::Char('x'));
        assert_eq!(v.playground.request.build_url(), "https://api.example.com/v1/");

        press(&mut v, KeyCode::Char('d'));
        press(&mut v, KeyCode::Char('d'));
        assert!(v.playground.request.query_params.is_empty());
    }

    #[test]
    fn test_method_cycles_with_m() {
        let mut v = view();
        press(&mut v, KeyCode::Char('m'));
        assert_eq!(v.playground.request.method, HttpMethod::Post);
        press(&mut v, KeyCode::Char('M'));
        assert_eq!(v.playground.request.method, HttpMethod::Get);
    }

    #[test]
    fn test_send_without_key_opens_prompt() {
        let mut v = view();
        v.send();
        assert!(v.credential_prompt.is_some());
        assert!(v.playground.missing_credential());
        assert!(v.notice().unwrap().is_error);
        assert!(v.playground.history.is_empty());

        type_text(&mut v, "sk_dev_123");
        press(&mut v, KeyCode::Enter);
        assert!(v.credential_prompt.is_none());
        assert_eq!(v.playground.vault.raw(), Some("sk_dev_123"));
        assert!(!v.playground.missing_credential());
    }

    #[test]
    fn test_send_round_trip_through_worker() {
        let mut v = view();
        v.playground.set_credential("sk_dev_123").unwrap();
        v.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(v.playground.is_in_flight());
        wait_for_response(&mut v);

        let record = v.playground.current_response().unwrap();
        assert_eq!(record.status, Some(200));
        assert_eq!(record.body["url"], "https://api.example.com/v1/");
        assert_eq!(v.playground.history.len(), 1);
    }

    #[test]
    fn test_preset_picker_applies_preset() {
        let mut v = view();
        assert!(v.handle_leader_action('p'));
        assert_eq!(v.mode(), InputMode::Insert);
        type_text(&mut v, "upload");
        press(&mut v, KeyCode::Enter);
        assert!(v.playground.request.is_multipart);
        assert_eq!(v.playground.request.method, HttpMethod::Post);
    }

    #[test]
    fn test_reset_keeps_credential() {
        let mut v = view();
        v.playground.set_credential("sk_dev_keep").unwrap();
        v.playground.request.path = "/photos".into();
        v.reset().unwrap();
        assert_eq!(v.playground.request.path, "/");
        assert_eq!(v.playground.vault.raw(), Some("sk_dev_keep"));
    }

    #[test]
    fn test_format_body_error_is_reported() {
        let mut v = view();
        v.playground.request.body = "{oops".into();
        v.handle_leader_action('f');
        assert!(v.body_error.is_some());
        assert_eq!(v.playground.request.body, "{oops");
    }

    #[test]
    fn test_hub_actions_are_returned() {
        let mut v = view();
        assert_eq!(press(&mut v, KeyCode::Char(':')), Action::SetMode(InputMode::Command));
        assert_eq!(press(&mut v, KeyCode::Char(' ')), Action::LeaderKey);
        v.reset_key_state();
        assert_eq!(press(&mut v, KeyCode::Char('?')), Action::Help);
    }
}
