//! Async action logic: talk to the server, then dispatch on the outcome.
//!
//! Failures are logged and swallowed here. Nothing is written to the cache
//! until the server has confirmed the change.

use super::action::*;
use super::dispatcher::Store;
use crate::api::{BugId, BugPatch, NewBug, UserId};
use chrono::Utc;
use tracing::{debug, info, warn};

impl Store {
  /// Run `thunk` to completion. Never fails; see the module docs.
  pub async fn dispatch_thunk(&self, thunk: Thunk) {
    debug!(thunk = thunk.kind(), "running thunk");
    match thunk {
      Thunk::LoadBugs => self.load_bugs().await,
      Thunk::AddBug(bug) => self.add_bug(bug).await,
      Thunk::ResolveBug(id) => self.resolve_bug(id).await,
      Thunk::AssignBugToUser { bug_id, user_id } => self.assign_bug_to_user(bug_id, user_id).await,
    }
  }

  async fn load_bugs(&self) {
    let last_fetch = self.get_state().last_fetch;
    if self.inner.freshness.is_fresh(last_fetch, Utc::now()) {
      debug!(?last_fetch, "bugs cached, skipping fetch");
      return;
    }

    self.dispatch(bugs_requested());

    match self.inner.api.list_bugs().await {
      Ok(bugs) => {
        info!(count = bugs.len(), "bugs loaded");
        self.dispatch(bugs_received(bugs, Utc::now()));
      }
      Err(e) => {
        warn!("Failed to load bugs: {}", e);
        self.dispatch(bugs_request_failed(e.to_string()));
      }
    }
  }

  async fn add_bug(&self, bug: NewBug) {
    match self.inner.api.create_bug(bug).await {
      Ok(saved) => {
        info!(id = %saved.id, "bug added");
        self.dispatch(bug_added(saved));
      }
      Err(e) => warn!("Failed to add bug: {}", e),
    }
  }

  async fn resolve_bug(&self, id: BugId) {
    match self.inner.api.patch_bug(id, BugPatch::resolve()).await {
      Ok(_) => {
        info!(%id, "bug resolved");
        self.dispatch(bug_resolved(id));
      }
      Err(e) => warn!("Failed to resolve bug {}: {}", id, e),
    }
  }

  async fn assign_bug_to_user(&self, bug_id: BugId, user_id: UserId) {
    match self
      .inner
      .api
      .patch_bug(bug_id, BugPatch::assign(user_id))
      .await
    {
      Ok(_) => {
        info!(%bug_id, %user_id, "bug assigned");
        self.dispatch(bug_assigned(bug_id, user_id));
      }
      Err(e) => warn!("Failed to assign bug {} to user {}: {}", bug_id, user_id, e),
    }
  }
}
