use super::action::Action;
use super::state::BugsState;
use crate::api::{Bug, BugId};
use std::sync::Arc;

/// Apply `action` to `state`, producing the next state.
///
/// Never fails and never touches `state`. Actions that do not change the
/// list reuse the same `Arc`.
pub fn reduce(state: &BugsState, action: &Action) -> BugsState {
  match action {
    Action::BugsRequested => BugsState {
      loading: true,
      ..state.clone()
    },
    Action::BugsReceived { bugs, received_at } => {
      let mut list = Vec::with_capacity(bugs.len());
      for bug in bugs {
        upsert(&mut list, bug.clone());
      }
      BugsState {
        list: Arc::new(list),
        loading: false,
        last_fetch: Some(*received_at),
      }
    }
    Action::BugsRequestFailed { .. } => BugsState {
      loading: false,
      ..state.clone()
    },
    Action::BugAdded(bug) => {
      let mut list = state.list.as_ref().clone();
      upsert(&mut list, bug.clone());
      BugsState {
        list: Arc::new(list),
        ..state.clone()
      }
    }
    Action::BugResolved(id) => update(state, *id, |bug| bug.resolved = true),
    Action::BugAssigned { bug_id, user_id } => {
      update(state, *bug_id, |bug| bug.user_id = Some(*user_id))
    }
  }
}

/// Replace the bug with the same id in place, or append it.
fn upsert(list: &mut Vec<Bug>, bug: Bug) {
  match list.iter_mut().find(|existing| existing.id == bug.id) {
    Some(existing) => *existing = bug,
    None => list.push(bug),
  }
}

fn update(state: &BugsState, id: BugId, apply: impl FnOnce(&mut Bug)) -> BugsState {
  let Some(idx) = state.list.iter().position(|bug| bug.id == id) else {
    return state.clone();
  };

  let mut list = state.list.as_ref().clone();
  apply(&mut list[idx]);
  BugsState {
    list: Arc::new(list),
    ..state.clone()
  }
}
