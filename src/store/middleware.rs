//! Interceptors run for every dispatched action before it reaches the reducer.

use super::action::Action;
use super::state::BugsState;
use std::sync::Arc;
use tracing::debug;

/// A step in the dispatch pipeline.
///
/// Calling `next.run(action)` hands the action on to the rest of the
/// pipeline. Not calling it drops the action.
pub trait Middleware: Send + Sync {
  fn process(&self, action: Action, state: &BugsState, next: Next<'_>);
}

/// The remainder of the pipeline, ending in the reducer commit.
pub struct Next<'a> {
  chain: &'a [Arc<dyn Middleware>],
  state: &'a BugsState,
  commit: &'a mut dyn FnMut(Action),
}

impl<'a> Next<'a> {
  pub(super) fn new(
    chain: &'a [Arc<dyn Middleware>],
    state: &'a BugsState,
    commit: &'a mut dyn FnMut(Action),
  ) -> Self {
    Self {
      chain,
      state,
      commit,
    }
  }

  pub fn run(self, action: Action) {
    match self.chain.split_first() {
      Some((head, rest)) => head.process(
        action,
        self.state,
        Next {
          chain: rest,
          state: self.state,
          commit: self.commit,
        },
      ),
      None => (self.commit)(action),
    }
  }
}

/// Logs every action at debug level, tagged with a destination label.
pub struct Logger {
  destination: String,
}

impl Logger {
  pub fn new(destination: impl Into<String>) -> Self {
    Self {
      destination: destination.into(),
    }
  }
}

impl Middleware for Logger {
  fn process(&self, action: Action, state: &BugsState, next: Next<'_>) {
    debug!(
      destination = %self.destination,
      action = action.kind(),
      bugs = state.list.len(),
      loading = state.loading,
      "dispatching"
    );
    if let Action::BugsRequestFailed { reason } = &action {
      debug!(destination = %self.destination, %reason, "fetch failure reported");
    }
    next.run(action);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::action::{bug_resolved, bugs_requested};
  use crate::api::BugId;
  use std::sync::Mutex;

  struct Recorder {
    name: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
  }

  impl Middleware for Recorder {
    fn process(&self, action: Action, _state: &BugsState, next: Next<'_>) {
      self
        .seen
        .lock()
        .unwrap()
        .push(format!("{}:{}", self.name, action.kind()));
      next.run(action);
    }
  }

  struct DropResolves;

  impl Middleware for DropResolves {
    fn process(&self, action: Action, _state: &BugsState, next: Next<'_>) {
      if !matches!(action, Action::BugResolved(_)) {
        next.run(action);
      }
    }
  }

  fn run_chain(chain: &[Arc<dyn Middleware>], action: Action) -> Vec<Action> {
    let state = BugsState::new();
    let mut committed = Vec::new();
    let mut commit = |action: Action| committed.push(action);
    Next::new(chain, &state, &mut commit).run(action);
    committed
  }

  #[test]
  fn test_chain_runs_in_order_then_commits() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let chain: Vec<Arc<dyn Middleware>> = vec![
      Arc::new(Recorder {
        name: "first",
        seen: seen.clone(),
      }),
      Arc::new(Logger::new("console")),
      Arc::new(Recorder {
        name: "second",
        seen: seen.clone(),
      }),
    ];

    let committed = run_chain(&chain, bugs_requested());

    assert_eq!(committed, vec![bugs_requested()]);
    assert_eq!(
      *seen.lock().unwrap(),
      vec!["first:bugs/bugsRequested", "second:bugs/bugsRequested"]
    );
  }

  #[test]
  fn test_empty_chain_commits_directly() {
    assert_eq!(run_chain(&[], bugs_requested()), vec![bugs_requested()]);
  }

  #[test]
  fn test_middleware_can_stop_an_action() {
    let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(DropResolves)];

    assert!(run_chain(&chain, bug_resolved(BugId(1))).is_empty());
    assert_eq!(run_chain(&chain, bugs_requested()).len(), 1);
  }
}
