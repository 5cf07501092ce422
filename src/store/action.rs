//! Actions and their creators.
//!
//! An `Action` is applied synchronously by the reducer. A `Thunk` describes
//! async work against the server that ends in zero or more actions.

use crate::api::{Bug, BugId, NewBug, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  BugsRequested,
  BugsReceived {
    bugs: Vec<Bug>,
    received_at: DateTime<Utc>,
  },
  BugsRequestFailed {
    reason: String,
  },
  BugAdded(Bug),
  BugResolved(BugId),
  BugAssigned {
    bug_id: BugId,
    user_id: UserId,
  },
}

impl Action {
  /// Stable name used in logs
  pub fn kind(&self) -> &'static str {
    match self {
      Action::BugsRequested => "bugs/bugsRequested",
      Action::BugsReceived { .. } => "bugs/bugsReceived",
      Action::BugsRequestFailed { .. } => "bugs/bugsRequestFailed",
      Action::BugAdded(_) => "bugs/bugAdded",
      Action::BugResolved(_) => "bugs/bugResolved",
      Action::BugAssigned { .. } => "bugs/bugAssigned",
    }
  }
}

pub fn bugs_requested() -> Action {
  Action::BugsRequested
}

pub fn bugs_received(bugs: Vec<Bug>, received_at: DateTime<Utc>) -> Action {
  Action::BugsReceived { bugs, received_at }
}

pub fn bugs_request_failed(reason: impl Into<String>) -> Action {
  Action::BugsRequestFailed {
    reason: reason.into(),
  }
}

pub fn bug_added(bug: Bug) -> Action {
  Action::BugAdded(bug)
}

pub fn bug_resolved(id: BugId) -> Action {
  Action::BugResolved(id)
}

pub fn bug_assigned(bug_id: BugId, user_id: UserId) -> Action {
  Action::BugAssigned { bug_id, user_id }
}

/// Async action run by `Store::dispatch_thunk`
#[derive(Debug, Clone, PartialEq)]
pub enum Thunk {
  LoadBugs,
  AddBug(NewBug),
  ResolveBug(BugId),
  AssignBugToUser { bug_id: BugId, user_id: UserId },
}

impl Thunk {
  pub fn kind(&self) -> &'static str {
    match self {
      Thunk::LoadBugs => "loadBugs",
      Thunk::AddBug(_) => "addBug",
      Thunk::ResolveBug(_) => "resolveBug",
      Thunk::AssignBugToUser { .. } => "assignBugToUser",
    }
  }
}

pub fn load_bugs() -> Thunk {
  Thunk::LoadBugs
}

pub fn add_bug(bug: NewBug) -> Thunk {
  Thunk::AddBug(bug)
}

pub fn resolve_bug(id: BugId) -> Thunk {
  Thunk::ResolveBug(id)
}

pub fn assign_bug_to_user(bug_id: BugId, user_id: UserId) -> Thunk {
  Thunk::AssignBugToUser { bug_id, user_id }
}
