use crate::api::{Bug, BugId};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Cached bug collection plus fetch status.
///
/// `list` is shared between successive states when an action leaves it
/// untouched, so `Arc::ptr_eq` on two lists tells whether it changed.
#[derive(Debug, Clone, Default)]
pub struct BugsState {
  pub list: Arc<Vec<Bug>>,
  /// True only while a fetch-all request is in flight
  pub loading: bool,
  /// When the list was last replaced by a successful fetch
  pub last_fetch: Option<DateTime<Utc>>,
}

impl BugsState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn find(&self, id: BugId) -> Option<&Bug> {
    self.list.iter().find(|bug| bug.id == id)
  }
}

/// How long a successful fetch keeps `load_bugs` off the network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Freshness {
  /// Any earlier fetch counts as fresh
  #[default]
  Forever,
  MaxAge(Duration),
}

impl Freshness {
  /// Ages too large for a `Duration` never expire in practice, so they
  /// map to `Forever`.
  pub fn from_max_age_secs(secs: Option<u64>) -> Self {
    secs
      .and_then(|secs| i64::try_from(secs).ok())
      .and_then(Duration::try_seconds)
      .map_or(Freshness::Forever, Freshness::MaxAge)
  }

  pub fn is_fresh(&self, last_fetch: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match (self, last_fetch) {
      (_, None) => false,
      (Freshness::Forever, Some(_)) => true,
      (Freshness::MaxAge(max_age), Some(at)) => now - at <= *max_age,
    }
  }
}
