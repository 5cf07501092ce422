//! Derived views over `BugsState`.

use super::state::BugsState;
use crate::api::{Bug, UserId};
use std::sync::{Arc, Mutex};

/// Bugs not marked resolved, in list order
pub fn unresolved_bugs(state: &BugsState) -> Vec<&Bug> {
  state.list.iter().filter(|bug| !bug.resolved).collect()
}

/// Bugs assigned to `user_id`, in list order
pub fn bugs_by_user(state: &BugsState, user_id: UserId) -> Vec<&Bug> {
  state
    .list
    .iter()
    .filter(|bug| bug.user_id == Some(user_id))
    .collect()
}

type Cached = (Arc<Vec<Bug>>, Arc<Vec<Bug>>);

/// Caches a derived list until the input list changes identity.
pub struct MemoizedSelector<F> {
  select: F,
  cached: Mutex<Option<Cached>>,
}

impl<F> MemoizedSelector<F>
where
  F: Fn(&BugsState) -> Vec<Bug>,
{
  pub fn new(select: F) -> Self {
    Self {
      select,
      cached: Mutex::new(None),
    }
  }

  pub fn select(&self, state: &BugsState) -> Arc<Vec<Bug>> {
    let mut cached = self
      .cached
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner);

    if let Some((input, output)) = cached.as_ref() {
      if Arc::ptr_eq(input, &state.list) {
        return output.clone();
      }
    }

    let output = Arc::new((self.select)(state));
    *cached = Some((state.list.clone(), output.clone()));
    output
  }
}

pub type ListSelector = MemoizedSelector<fn(&BugsState) -> Vec<Bug>>;

/// Memoized `unresolved_bugs`
pub fn unresolved_bugs_memo() -> ListSelector {
  fn select(state: &BugsState) -> Vec<Bug> {
    unresolved_bugs(state).into_iter().cloned().collect()
  }
  MemoizedSelector::new(select as fn(&BugsState) -> Vec<Bug>)
}
