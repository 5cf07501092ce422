use crate::api::{Bug, BugId, NewBug, UserId};
use crate::event::Event;
use crate::store::action::{add_bug, assign_bug_to_user, load_bugs, resolve_bug};
use crate::store::selectors::{unresolved_bugs_memo, ListSelector};
use crate::store::{BugsState, Store, Subscription};
use crate::ui::components::{Prompt, PromptResult};
use crate::ui::renderfns::{assignee_label, resolution_color, resolution_label, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::BugDetailView;
use crate::ui::{ensure_valid_selection, spawn_thunk};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// What an open prompt will do with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
  NewBug,
  AssignUser(BugId),
}

/// List of all bugs in the store.
///
/// Subscribes on creation and unsubscribes when dropped.
pub struct BugListView {
  store: Store,
  state: Arc<BugsState>,
  unresolved_only: bool,
  unresolved: ListSelector,
  list_state: ListState,
  prompt: Option<Prompt<PendingInput>>,
  message: Option<String>,
  _subscription: Subscription,
}

impl BugListView {
  /// Subscribe to `store`, posting `Event::StoreChanged` to `events` on every
  /// commit, and start loading bugs.
  pub fn new(store: Store, events: mpsc::UnboundedSender<Event>) -> Self {
    let subscription = store.subscribe(move |_| {
      let _ = events.send(Event::StoreChanged);
    });

    spawn_thunk(&store, load_bugs());

    Self {
      state: store.get_state(),
      store,
      unresolved_only: false,
      unresolved: unresolved_bugs_memo(),
      list_state: ListState::default(),
      prompt: None,
      message: None,
      _subscription: subscription,
    }
  }

  /// Bugs currently shown, after the unresolved filter
  fn visible(&self) -> Arc<Vec<Bug>> {
    if self.unresolved_only {
      self.unresolved.select(&self.state)
    } else {
      self.state.list.clone()
    }
  }

  fn selected_id(&self) -> Option<BugId> {
    let idx = self.list_state.selected()?;
    self.visible().get(idx).map(|bug| bug.id)
  }

  fn sync(&mut self) {
    let next = self.store.get_state();
    if !Arc::ptr_eq(&next.list, &self.state.list) {
      debug!(count = next.list.len(), "bug list changed");
    }
    self.state = next;
  }

  fn submit(&mut self, purpose: PendingInput, value: String) {
    let value = value.trim();
    match purpose {
      PendingInput::NewBug => {
        if value.is_empty() {
          self.message = Some("Description is required".to_string());
          return;
        }
        spawn_thunk(&self.store, add_bug(NewBug::new(value)));
      }
      PendingInput::AssignUser(bug_id) => match value.parse::<u64>() {
        Ok(user) => spawn_thunk(&self.store, assign_bug_to_user(bug_id, UserId(user))),
        Err(_) => self.message = Some(format!("Not a user id: {}", value)),
      },
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let bugs = self.visible();
    ensure_valid_selection(&mut self.list_state, bugs.len());

    let filter = if self.unresolved_only { "unresolved" } else { "all" };
    let title = if self.state.loading {
      format!(" Bugs [{}] (loading...) ", filter)
    } else {
      format!(" Bugs [{}] ({}) ", filter, bugs.len())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if bugs.is_empty() {
      let content = if self.state.loading {
        "Loading bugs..."
      } else if self.state.last_fetch.is_none() {
        "No bugs loaded. Check the log for errors."
      } else {
        "No bugs found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = bugs
      .iter()
      .map(|bug| {
        let line = Line::from(vec![
          Span::styled(format!("#{:<6}", bug.id.0), Style::default().fg(Color::Cyan)),
          Span::raw(" "),
          Span::styled(
            format!("{:<9}", resolution_label(bug)),
            Style::default().fg(resolution_color(bug)),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", assignee_label(bug)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::raw(truncate(&bug.description, 60)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for BugListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(prompt) = &mut self.prompt {
      match prompt.handle_key(key) {
        PromptResult::Pending => {}
        PromptResult::Cancelled => self.prompt = None,
        PromptResult::Submitted(purpose, value) => {
          self.prompt = None;
          self.submit(purpose, value);
        }
      }
      return ViewAction::None;
    }

    self.message = None;
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('a') => self.prompt = Some(Prompt::new("New bug", PendingInput::NewBug)),
      KeyCode::Char('r') => {
        if let Some(id) = self.selected_id() {
          spawn_thunk(&self.store, resolve_bug(id));
        }
      }
      KeyCode::Char('u') => {
        if let Some(id) = self.selected_id() {
          self.prompt = Some(Prompt::new(
            format!("Assign #{} to user id", id),
            PendingInput::AssignUser(id),
          ));
        }
      }
      KeyCode::Char('f') => {
        self.unresolved_only = !self.unresolved_only;
        self.list_state.select(None);
      }
      KeyCode::Enter => {
        if let Some(id) = self.selected_id() {
          return ViewAction::Push(Box::new(BugDetailView::new(self.store.clone(), id)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    if let Some(prompt) = &self.prompt {
      prompt.render(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Bugs".to_string()
  }

  fn tick(&mut self) {
    self.sync();
  }

  fn status(&self) -> Option<String> {
    if let Some(message) = &self.message {
      return Some(message.clone());
    }
    self.state.loading.then(|| "loading bugs...".to_string())
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("a", "add"),
      Shortcut::new("r", "resolve"),
      Shortcut::new("u", "assign"),
      Shortcut::new("f", "unresolved"),
      Shortcut::new("enter", "details"),
      Shortcut::new("q", "quit"),
    ]
  }
}
