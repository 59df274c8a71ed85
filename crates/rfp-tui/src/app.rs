use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::DocumentApi;
use crate::bulk::{self, BulkOutcome, MoveOption};
use crate::tree::{DocumentStore, Node, PendingDelete};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Filter,
    NewFolder { parent: Option<String> },
    Upload,
    ConfirmDelete(PendingDelete),
    Move { options: Vec<MoveOption>, cursor: usize },
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Redraw only.
    Resize,
    Reload,
}

pub struct App {
    pub api: Box<dyn DocumentApi>,
    pub store: DocumentStore,
    pub mode: Mode,
    pub cursor: usize,
    pub filter: String,
    pub input: String,

    // Loading state
    pub loading: bool,
    pub loading_message: String,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(api: Box<dyn DocumentApi>) -> Self {
        Self {
            api,
            store: DocumentStore::new(),
            mode: Mode::Browse,
            cursor: 0,
            filter: String::new(),
            input: String::new(),
            loading: false,
            loading_message: String::new(),
            error_message: None,
            status_message: None,
        }
    }

    pub fn set_loading(&mut self, loading: bool, message: &str) {
        self.loading = loading;
        self.loading_message = message.to_string();
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    fn report(&mut self, outcome: BulkOutcome) {
        if outcome.attempted == 0 || (outcome.is_success() && outcome.reloaded) {
            self.status_message = Some(outcome.notification());
        } else {
            self.set_error(outcome.notification());
        }
        self.clamp_cursor();
    }

    pub fn row_count(&self) -> usize {
        self.store.rows(&self.filter).count()
    }

    pub fn cursor_node(&self) -> Option<&Node> {
        self.store.rows(&self.filter).nth(self.cursor).map(|row| row.node)
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.row_count().saturating_sub(1));
    }

    pub async fn load(&mut self) {
        self.set_loading(true, "Loading documents...");
        if let Err(e) = self.store.reload(self.api.as_ref()).await {
            self.set_error(format!("Failed to load documents: {}", e));
        }
        self.clamp_cursor();
        self.set_loading(false, "");
    }

    /// Handle key events, returns true if app should quit
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Global quit with Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        // Any key acknowledges an error notification
        if self.error_message.take().is_some() {
            self.store.acknowledge_failure();
            return Ok(false);
        }

        if self.loading {
            return Ok(false);
        }

        match self.mode.clone() {
            Mode::Browse => return self.handle_browse_key(key).await,
            Mode::Filter => self.handle_filter_key(key),
            Mode::NewFolder { parent } => self.handle_new_folder_key(key, parent).await,
            Mode::Upload => self.handle_upload_key(key).await,
            Mode::ConfirmDelete(pending) => self.handle_confirm_key(key, pending).await,
            Mode::Move { options, cursor } => self.handle_move_key(key, options, cursor).await,
        }

        Ok(false)
    }

    async fn handle_browse_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.status_message = None;

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor < self.row_count().saturating_sub(1) {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('h') | KeyCode::Left => {
                if let Some(id) = self.cursor_node().map(|n| n.id.clone()) {
                    self.store.toggle_expansion(&id);
                    self.clamp_cursor();
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.cursor_node().map(|n| n.id.clone()) {
                    self.store.toggle_selection(&id);
                }
            }
            KeyCode::Char('a') => {
                let checked = !self.store.all_selected();
                self.store.select_all(checked);
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Filter;
            }
            KeyCode::Esc => {
                self.filter.clear();
                self.clamp_cursor();
            }
            KeyCode::Char('r') => self.load().await,
            KeyCode::Char('R') => self.do_reindex().await,
            KeyCode::Char('d') | KeyCode::Delete => match self.store.prepare_delete() {
                Some(pending) => self.mode = Mode::ConfirmDelete(pending),
                None => self.status_message = Some("Nothing selected".to_string()),
            },
            KeyCode::Char('m') => {
                if self.store.state().selection_len() == 0 {
                    self.status_message = Some("Nothing selected".to_string());
                } else {
                    self.mode = Mode::Move {
                        options: bulk::move_targets(&self.store),
                        cursor: 0,
                    };
                }
            }
            KeyCode::Char('n') => {
                self.input.clear();
                self.mode = Mode::NewFolder { parent: None };
            }
            KeyCode::Char('N') => {
                let parent = self
                    .cursor_node()
                    .filter(|n| n.is_folder())
                    .map(|n| n.id.clone());
                self.input.clear();
                self.mode = Mode::NewFolder { parent };
            }
            KeyCode::Char('u') => {
                self.input.clear();
                self.mode = Mode::Upload;
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => self.mode = Mode::Browse,
            KeyCode::Char(c) => self.filter.push(c),
            KeyCode::Backspace => {
                self.filter.pop();
            }
            _ => {}
        }
        self.clamp_cursor();
    }

    /// Shared line editing for the prompt modes. Returns the submitted text.
    fn edit_input(&mut self, key: KeyEvent) -> Option<String> {
        match key.code {
            KeyCode::Esc => {
                self.input.clear();
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => {
                let text = self.input.trim().to_string();
                if !text.is_empty() {
                    self.input.clear();
                    self.mode = Mode::Browse;
                    return Some(text);
                }
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
        None
    }

    async fn handle_new_folder_key(&mut self, key: KeyEvent, parent: Option<String>) {
        let Some(name) = self.edit_input(key) else {
            return;
        };

        self.set_loading(true, "Creating folder...");
        match self.api.create_folder(&name, parent.as_deref()).await {
            Ok(folder) => {
                tracing::info!(id = %folder.id, "Folder created");
                self.status_message = Some(format!("Folder '{}' created", folder.name));
            }
            Err(e) => {
                tracing::error!("Failed to create folder: {}", e);
                self.set_error(format!("Failed to create folder: {}", e));
            }
        }
        self.set_loading(false, "");
        self.reload_quietly().await;
    }

    async fn handle_upload_key(&mut self, key: KeyEvent) {
        let Some(input) = self.edit_input(key) else {
            return;
        };
        let paths: Vec<&str> = input
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if paths.is_empty() {
            return;
        }

        self.set_loading(true, &format!("Uploading {} file(s)...", paths.len()));
        let outcome = bulk::upload(self.api.as_ref(), &mut self.store, &paths).await;
        self.set_loading(false, "");

        if outcome.is_success() && outcome.reloaded {
            self.status_message = Some(outcome.notification());
        } else {
            self.set_error(outcome.notification());
        }
        self.clamp_cursor();
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent, pending: PendingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = Mode::Browse;
                self.set_loading(true, &format!("Deleting {} item(s)...", pending.len()));
                let outcome = bulk::delete(self.api.as_ref(), &mut self.store, pending).await;
                self.set_loading(false, "");
                self.report(outcome);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Browse;
            }
            _ => {}
        }
    }

    async fn handle_move_key(&mut self, key: KeyEvent, options: Vec<MoveOption>, cursor: usize) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Char('j') | KeyCode::Down => {
                let cursor = (cursor + 1).min(options.len().saturating_sub(1));
                self.mode = Mode::Move { options, cursor };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let cursor = cursor.saturating_sub(1);
                self.mode = Mode::Move { options, cursor };
            }
            KeyCode::Enter => {
                let Some(choice) = options.get(cursor) else {
                    return;
                };
                let target = choice.target.clone();
                self.mode = Mode::Browse;
                self.set_loading(true, "Moving...");
                let outcome = bulk::move_selected(self.api.as_ref(), &mut self.store, &target).await;
                self.set_loading(false, "");
                self.report(outcome);
            }
            _ => {}
        }
    }

    async fn do_reindex(&mut self) {
        let Some(node) = self.cursor_node() else {
            return;
        };
        if node.is_folder() {
            self.status_message = Some("Only files can be re-parsed".to_string());
            return;
        }
        let id = node.id.clone();

        let outcome = bulk::reindex(self.api.as_ref(), &mut self.store, &id).await;
        self.report(outcome);
    }

    /// Reload after a single-item action. The action's own message wins.
    async fn reload_quietly(&mut self) {
        if let Err(e) = self.store.reload(self.api.as_ref()).await {
            tracing::debug!("Refresh after action failed: {}", e);
        }
        self.clamp_cursor();
    }
}
