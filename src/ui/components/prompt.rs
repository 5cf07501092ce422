use super::input::{InputResult, TextInput};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Outcome of a key press while a prompt is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult<T> {
  /// Still editing
  Pending,
  /// Enter pressed; the prompt is finished
  Submitted(T, String),
  /// Esc pressed; the prompt is finished
  Cancelled,
}

/// One-line input overlay that remembers what it was opened for.
#[derive(Debug, Clone)]
pub struct Prompt<T> {
  title: String,
  purpose: T,
  input: TextInput,
}

impl<T: Clone> Prompt<T> {
  pub fn new(title: impl Into<String>, purpose: T) -> Self {
    Self {
      title: title.into(),
      purpose,
      input: TextInput::new(),
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> PromptResult<T> {
    match self.input.handle_key(key) {
      InputResult::Submitted(value) => PromptResult::Submitted(self.purpose.clone(), value),
      InputResult::Cancelled => PromptResult::Cancelled,
      InputResult::Consumed | InputResult::NotHandled => PromptResult::Pending,
    }
  }

  /// Draw the prompt near the bottom of `area`
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = ((area.width as u32 * 60 / 100) as u16).clamp(30.min(area.width), 70.min(area.width));
    let height = 3.min(area.height);
    let x = area.x + 1.min(area.width.saturating_sub(width));
    let y = area.y + area.height.saturating_sub(height + 1);
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    let (before, after) = self.input.split_at_cursor();
    let mut spans = vec![
      Span::styled("> ", Style::default().fg(Color::Yellow)),
      Span::raw(before),
      Span::styled("_", Style::default().fg(Color::Yellow)),
      Span::raw(after),
    ];
    if self.input.is_empty() {
      spans.push(Span::styled(
        "  Enter submit, Esc cancel",
        Style::default().fg(Color::DarkGray),
      ));
    }
    let line = Line::from(spans);
    frame.render_widget(Paragraph::new(line), inner);
  }
}
