pub mod components;
mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use crate::store::action::Thunk;
use crate::store::Store;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.shortcuts();
  draw_header(frame, chunks[0], app.title(), app.api_url(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  let status = app.status();
  draw_footer(frame, chunks[2], &app.view_breadcrumb(), status.as_deref());
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

/// Run `thunk` against `store` in the background
pub fn spawn_thunk(store: &Store, thunk: Thunk) {
  let store = store.clone();
  tokio::spawn(async move {
    store.dispatch_thunk(thunk).await;
  });
}
