use crate::api::HttpBugApi;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::store::middleware::Logger;
use crate::store::{Freshness, Store};
use crate::ui;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::BugListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Header label
  title: String,

  api_url: String,

  events: EventHandler,

  should_quit: bool,
}

impl App {
  /// Build the store and the root view. This is the only place a `Store`
  /// is created; views receive clones of it.
  pub fn new(config: &Config) -> Result<Self> {
    let api = HttpBugApi::new(config)?;
    info!(url = %api.base(), "using bug tracker API");

    let store = Store::builder(api)
      .middleware(Logger::new("file"))
      .freshness(Freshness::from_max_age_secs(config.cache.max_age_secs))
      .build();

    let events = EventHandler::new(Duration::from_millis(250));
    let root = BugListView::new(store, events.sender());

    Ok(Self {
      view_stack: vec![Box::new(root)],
      title: config.display_title(),
      api_url: config.api.url.clone(),
      events,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.main_loop(&mut terminal).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match self.events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick | Event::StoreChanged => {
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let Some(view) = self.view_stack.last_mut() else {
      self.should_quit = true;
      return;
    };

    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(mut next) => {
        next.tick();
        self.view_stack.push(next);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
          if let Some(view) = self.view_stack.last_mut() {
            view.tick();
          }
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  pub fn shortcuts(&self) -> Vec<Shortcut> {
    self
      .view_stack
      .last()
      .map(|view| view.shortcuts())
      .unwrap_or_default()
  }

  pub fn status(&self) -> Option<String> {
    self.view_stack.last().and_then(|view| view.status())
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }
}
