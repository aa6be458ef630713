use crate::api::Item;
use crate::config::Config;
use crate::event::{Event, EventHandler, ModelEvent};
use crate::model::{ItemModel, UsersModel};
use crate::ui;
use crate::users::{user_details, user_rows, UserRow};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// View state - each variant owns its data
#[derive(Debug)]
pub enum ViewState {
  // Root view
  UserList {
    rows: Vec<UserRow>,
    selected: usize,
    loading: bool,
  },

  // Detail view (pushed via Enter)
  UserDetail {
    item: Box<Item>,
    lines: Vec<(&'static str, String)>,
  },
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<ViewState>,

  /// Header title
  title: String,

  /// Last error reported by the model, shown in the status bar
  status_error: Option<String>,

  model: Arc<UsersModel>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, model: Arc<UsersModel>) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();

    Self {
      view_stack: vec![ViewState::UserList {
        rows: Vec::new(),
        selected: 0,
        loading: true,
      }],
      title: config.display_title(),
      status_error: None,
      model,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Initial data load
    self.load_users();

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn load_users(&self) {
    let model = Arc::clone(&self.model);
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let _ = tx.send(Event::Model(ModelEvent::Loading));
      let event = match model.all_items().await {
        Ok(items) => ModelEvent::UsersLoaded(items),
        Err(e) => ModelEvent::Failed(e),
      };
      let _ = tx.send(Event::Model(event));
    });
  }

  fn load_user(&self, id: i64) {
    let model = Arc::clone(&self.model);
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let event = match model.single_item(id).await {
        Ok(item) => ModelEvent::UserLoaded(Box::new(item)),
        Err(e) => ModelEvent::Failed(e),
      };
      let _ = tx.send(Event::Model(event));
    });
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Model(model_event) => self.handle_model_event(model_event),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char('q') => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      KeyCode::Esc => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        }
      }

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Enter => self.enter_selected(),
      KeyCode::Char('r') => {
        self.view_stack.truncate(1);
        self.load_users();
      }

      _ => {}
    }
  }

  fn handle_model_event(&mut self, event: ModelEvent) {
    match event {
      ModelEvent::Loading => {
        if let Some(ViewState::UserList { loading, .. }) = self.view_stack.first_mut() {
          *loading = true;
        }
      }
      ModelEvent::UsersLoaded(items) => {
        debug!(count = items.len(), "users loaded");
        self.status_error = None;
        if let Some(ViewState::UserList {
          rows,
          selected,
          loading,
        }) = self.view_stack.first_mut()
        {
          *rows = user_rows(items.items());
          *selected = (*selected).min(rows.len().saturating_sub(1));
          *loading = false;
        }
      }
      ModelEvent::UserLoaded(item) => {
        self.status_error = None;
        // The user may have navigated away while the lookup was running
        if matches!(self.view_stack.last(), Some(ViewState::UserList { .. })) {
          let lines = user_details(&item);
          self.view_stack.push(ViewState::UserDetail { item, lines });
        }
      }
      ModelEvent::Failed(error) => {
        if let Some(ViewState::UserList { loading, .. }) = self.view_stack.first_mut() {
          *loading = false;
        }
        self.status_error = Some(error.messages().join("; "));
      }
    }
  }

  fn move_selection(&mut self, delta: i32) {
    if let Some(ViewState::UserList { rows, selected, .. }) = self.view_stack.last_mut() {
      let len = rows.len();
      if len > 0 {
        *selected = (*selected as i32 + delta).rem_euclid(len as i32) as usize;
      }
    }
  }

  fn enter_selected(&mut self) {
    if let Some(ViewState::UserList { rows, selected, .. }) = self.view_stack.last() {
      if let Some(row) = rows.get(*selected) {
        self.load_user(row.id);
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&ViewState> {
    self.view_stack.last()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn status_error(&self) -> Option<&str> {
    self.status_error.as_deref()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

impl ViewState {
  /// Get the label for this view in the breadcrumb
  fn breadcrumb_label(&self) -> String {
    match self {
      ViewState::UserList { .. } => "Users".to_string(),
      ViewState::UserDetail { item, .. } => match item.text("username") {
        Some(username) => username,
        None => format!("#{}", item.id().unwrap_or_default()),
      },
    }
  }
}
