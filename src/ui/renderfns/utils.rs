use crate::api::Bug;
use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a bug's resolution state
pub fn resolution_color(bug: &Bug) -> Color {
  if bug.resolved {
    Color::Green
  } else {
    Color::Yellow
  }
}

pub fn resolution_label(bug: &Bug) -> &'static str {
  if bug.resolved {
    "resolved"
  } else {
    "open"
  }
}

/// "user 7" or "unassigned"
pub fn assignee_label(bug: &Bug) -> String {
  match bug.user_id {
    Some(user) => format!("user {}", user),
    None => "unassigned".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::UserId;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_counts_chars() {
    assert_eq!(truncate("ééééé", 4), "é...");
  }

  #[test]
  fn test_resolution() {
    let mut bug = Bug::new(1, "a");
    assert_eq!(resolution_color(&bug), Color::Yellow);
    assert_eq!(resolution_label(&bug), "open");

    bug.resolved = true;
    assert_eq!(resolution_color(&bug), Color::Green);
    assert_eq!(resolution_label(&bug), "resolved");
  }

  #[test]
  fn test_assignee_label() {
    let mut bug = Bug::new(1, "a");
    assert_eq!(assignee_label(&bug), "unassigned");
    bug.user_id = Some(UserId(7));
    assert_eq!(assignee_label(&bug), "user 7");
  }
}
