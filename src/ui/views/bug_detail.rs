use crate::api::{BugId, UserId};
use crate::store::action::{assign_bug_to_user, resolve_bug};
use crate::store::selectors::bugs_by_user;
use crate::store::{BugsState, Store};
use crate::ui::components::{Prompt, PromptResult};
use crate::ui::renderfns::{assignee_label, resolution_color, resolution_label};
use crate::ui::spawn_thunk;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::sync::Arc;

/// Details of one bug, read live from the store
pub struct BugDetailView {
  store: Store,
  id: BugId,
  state: Arc<BugsState>,
  prompt: Option<Prompt<BugId>>,
  message: Option<String>,
}

impl BugDetailView {
  pub fn new(store: Store, id: BugId) -> Self {
    Self {
      state: store.get_state(),
      store,
      id,
      prompt: None,
      message: None,
    }
  }

  fn assign(&mut self, bug_id: BugId, value: &str) {
    match value.trim().parse::<u64>() {
      Ok(user) => spawn_thunk(&self.store, assign_bug_to_user(bug_id, UserId(user))),
      Err(_) => self.message = Some(format!("Not a user id: {}", value.trim())),
    }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" Bug #{} ", self.id))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(bug) = self.state.find(self.id) else {
      let paragraph =
        Paragraph::new("Bug is no longer in the cache.").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(2), // Status, assignee
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    let workload = bug
      .user_id
      .map(|user| format!(" ({} bugs)", bugs_by_user(&self.state, user).len()))
      .unwrap_or_default();

    let header = vec![
      Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(resolution_label(bug), Style::default().fg(resolution_color(bug))),
      ]),
      Line::from(vec![
        Span::styled("Assignee: ", Style::default().fg(Color::DarkGray)),
        Span::raw(assignee_label(bug)),
        Span::styled(workload, Style::default().fg(Color::DarkGray)),
      ]),
    ];
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let desc = if bug.description.is_empty() {
      "No description"
    } else {
      bug.description.as_str()
    };
    frame.render_widget(Paragraph::new(desc).wrap(Wrap { trim: true }), chunks[2]);
  }
}

impl View for BugDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(prompt) = &mut self.prompt {
      match prompt.handle_key(key) {
        PromptResult::Pending => {}
        PromptResult::Cancelled => self.prompt = None,
        PromptResult::Submitted(bug_id, value) => {
          self.prompt = None;
          self.assign(bug_id, &value);
        }
      }
      return ViewAction::None;
    }

    self.message = None;
    match key.code {
      KeyCode::Char('r') => {
        spawn_thunk(&self.store, resolve_bug(self.id));
        ViewAction::None
      }
      KeyCode::Char('u') => {
        self.prompt = Some(Prompt::new(format!("Assign #{} to user id", self.id), self.id));
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
    if let Some(prompt) = &self.prompt {
      prompt.render(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    format!("#{}", self.id)
  }

  fn tick(&mut self) {
    self.state = self.store.get_state();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("r", "resolve"),
      Shortcut::new("u", "assign"),
      Shortcut::new("q", "back"),
    ]
  }

  fn status(&self) -> Option<String> {
    self.message.clone()
  }
}
