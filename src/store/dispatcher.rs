use super::action::Action;
use super::middleware::{Middleware, Next};
use super::reducer::reduce;
use super::state::{BugsState, Freshness};
use crate::api::BugApi;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

type Listener = Arc<dyn Fn(&Arc<BugsState>) + Send + Sync>;

#[derive(Default)]
struct Registry {
  next_id: u64,
  listeners: Vec<(u64, Listener)>,
}

/// Handle returned by `Store::subscribe`. Dropping it unsubscribes.
pub struct Subscription {
  id: u64,
  registry: Weak<Mutex<Registry>>,
}

impl Subscription {
  pub fn unsubscribe(self) {
    // Drop does the work
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(registry) = self.registry.upgrade() {
      lock(&registry).listeners.retain(|(id, _)| *id != self.id);
    }
  }
}

/// Who is currently dispatching, and what they still have to run.
#[derive(Default)]
struct Turn {
  owner: Option<ThreadId>,
  queue: VecDeque<Action>,
}

pub(super) struct Inner {
  pub(super) api: Arc<dyn BugApi>,
  pub(super) freshness: Freshness,
  state: Mutex<Arc<BugsState>>,
  middleware: Vec<Arc<dyn Middleware>>,
  registry: Arc<Mutex<Registry>>,
  turn: Mutex<Turn>,
  turn_free: Condvar,
}

/// Ends the current dispatch turn, also when a listener panics.
struct TurnGuard<'a> {
  inner: &'a Inner,
}

impl Drop for TurnGuard<'_> {
  fn drop(&mut self) {
    let mut turn = lock(&self.inner.turn);
    turn.owner = None;
    turn.queue.clear();
    drop(turn);
    self.inner.turn_free.notify_all();
  }
}

/// State container for the bug cache.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct Store {
  pub(super) inner: Arc<Inner>,
}

/// Builds a `Store`, composing its middleware pipeline in call order.
pub struct StoreBuilder {
  api: Arc<dyn BugApi>,
  freshness: Freshness,
  middleware: Vec<Arc<dyn Middleware>>,
}

impl StoreBuilder {
  pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
    self.middleware.push(Arc::new(middleware));
    self
  }

  pub fn freshness(mut self, freshness: Freshness) -> Self {
    self.freshness = freshness;
    self
  }

  pub fn build(self) -> Store {
    Store {
      inner: Arc::new(Inner {
        api: self.api,
        freshness: self.freshness,
        state: Mutex::new(Arc::new(BugsState::new())),
        middleware: self.middleware,
        registry: Arc::new(Mutex::new(Registry::default())),
        turn: Mutex::new(Turn::default()),
        turn_free: Condvar::new(),
      }),
    }
  }
}

impl Store {
  pub fn builder(api: impl BugApi + 'static) -> StoreBuilder {
    StoreBuilder {
      api: Arc::new(api),
      freshness: Freshness::default(),
      middleware: Vec::new(),
    }
  }

  /// Current state snapshot
  pub fn get_state(&self) -> Arc<BugsState> {
    lock(&self.inner.state).clone()
  }

  /// Run `action` through the middleware pipeline and into the reducer.
  ///
  /// Subscribers are notified synchronously after each commit. Dispatches
  /// never overlap: one from another thread waits for the running one to
  /// finish, and one made from a listener or middleware is queued and runs
  /// once the current action has notified everyone.
  pub fn dispatch(&self, action: Action) {
    let me = thread::current().id();
    let mut turn = lock(&self.inner.turn);
    if turn.owner == Some(me) {
      turn.queue.push_back(action);
      return;
    }
    while turn.owner.is_some() {
      turn = self
        .inner
        .turn_free
        .wait(turn)
        .unwrap_or_else(PoisonError::into_inner);
    }
    turn.owner = Some(me);
    turn.queue.push_back(action);
    drop(turn);

    let _guard = TurnGuard { inner: &self.inner };
    loop {
      let next = lock(&self.inner.turn).queue.pop_front();
      let Some(action) = next else {
        return;
      };
      self.run_pipeline(action);
    }
  }

  fn run_pipeline(&self, action: Action) {
    let before = self.get_state();
    let mut commit = |action: Action| self.commit(&action);
    Next::new(&self.inner.middleware, &before, &mut commit).run(action);
  }

  fn commit(&self, action: &Action) {
    let next = {
      let mut slot = lock(&self.inner.state);
      let next = Arc::new(reduce(&slot, action));
      *slot = next.clone();
      next
    };
    self.notify(&next);
  }

  fn notify(&self, state: &Arc<BugsState>) {
    // Snapshot so listeners may subscribe or unsubscribe while we iterate
    let listeners: Vec<Listener> = lock(&self.inner.registry)
      .listeners
      .iter()
      .map(|(_, listener)| listener.clone())
      .collect();

    for listener in listeners {
      listener(state);
    }
  }

  /// Register `listener` to run after every committed action.
  pub fn subscribe<F>(&self, listener: F) -> Subscription
  where
    F: Fn(&Arc<BugsState>) + Send + Sync + 'static,
  {
    let mut registry = lock(&self.inner.registry);
    registry.next_id += 1;
    let id = registry.next_id;
    registry.listeners.push((id, Arc::new(listener)));

    Subscription {
      id,
      registry: Arc::downgrade(&self.inner.registry),
    }
  }

  #[cfg(test)]
  pub fn subscriber_count(&self) -> usize {
    lock(&self.inner.registry).listeners.len()
  }
}

/// The guarded values are always replaced whole, so a poisoned lock still
/// holds a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fake::FakeBugApi;
  use crate::api::{Bug, BugId};
  use crate::store::action::*;
  use chrono::Utc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn store() -> Store {
    Store::builder(FakeBugApi::new()).build()
  }

  #[test]
  fn test_starts_empty() {
    let state = store().get_state();
    assert!(state.list.is_empty());
    assert!(!state.loading);
    assert_eq!(state.last_fetch, None);
  }

  #[test]
  fn test_dispatch_replaces_state() {
    let store = store();
    let before = store.get_state();

    store.dispatch(bug_added(Bug::new(1, "a")));

    let after = store.get_state();
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(before.list.is_empty());
    assert_eq!(after.list.len(), 1);
  }

  #[test]
  fn test_subscribers_notified_after_commit() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_listener = seen.clone();
    let _sub = store.subscribe(move |state| {
      seen_in_listener.lock().unwrap().push(state.list.len());
    });

    store.dispatch(bug_added(Bug::new(1, "a")));
    store.dispatch(bug_added(Bug::new(2, "b")));

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn test_listener_sees_committed_state() {
    let store = store();
    let observer = store.clone();
    let matched = Arc::new(AtomicUsize::new(0));
    let matched_in_listener = matched.clone();
    let _sub = store.subscribe(move |state| {
      if Arc::ptr_eq(state, &observer.get_state()) {
        matched_in_listener.fetch_add(1, Ordering::SeqCst);
      }
    });

    store.dispatch(bugs_requested());
    assert_eq!(matched.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_unsubscribe_stops_notifications() {
    let store = store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let sub = store.subscribe(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    store.dispatch(bugs_requested());
    sub.unsubscribe();
    store.dispatch(bugs_request_failed("boom"));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.subscriber_count(), 0);
  }

  #[test]
  fn test_dropping_subscription_unsubscribes() {
    let store = store();
    {
      let _sub = store.subscribe(|_| {});
      assert_eq!(store.subscriber_count(), 1);
    }
    assert_eq!(store.subscriber_count(), 0);
  }

  #[test]
  fn test_unsubscribe_during_notification() {
    let store = store();
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    let slot_in_listener = slot.clone();
    let counter = calls.clone();
    let sub = store.subscribe(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
      slot_in_listener.lock().unwrap().take();
    });
    *slot.lock().unwrap() = Some(sub);

    let later_calls = Arc::new(AtomicUsize::new(0));
    let later_counter = later_calls.clone();
    let _other = store.subscribe(move |_| {
      later_counter.fetch_add(1, Ordering::SeqCst);
    });

    store.dispatch(bugs_requested());
    store.dispatch(bugs_request_failed("boom"));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(later_calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_subscribe_and_dispatch_during_notification() {
    let store = store();
    let handle = store.clone();
    let added: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));
    let added_in_listener = added.clone();

    let _sub = store.subscribe(move |state| {
      if state.loading {
        added_in_listener.lock().unwrap().push(handle.subscribe(|_| {}));
        handle.dispatch(bugs_received(vec![Bug::new(1, "a")], Utc::now()));
      }
    });

    store.dispatch(bugs_requested());

    let state = store.get_state();
    assert!(!state.loading);
    assert_eq!(state.find(BugId(1)).map(|b| b.id), Some(BugId(1)));
    assert_eq!(store.subscriber_count(), 2);
  }

  #[test]
  fn test_middleware_sees_actions_before_reducer() {
    struct ListSizes(Arc<Mutex<Vec<usize>>>);
    impl Middleware for ListSizes {
      fn process(&self, action: Action, state: &BugsState, next: Next<'_>) {
        self.0.lock().unwrap().push(state.list.len());
        next.run(action);
      }
    }

    let sizes = Arc::new(Mutex::new(Vec::new()));
    let store = Store::builder(FakeBugApi::new())
      .middleware(ListSizes(sizes.clone()))
      .build();

    store.dispatch(bug_added(Bug::new(1, "a")));
    store.dispatch(bug_resolved(BugId(1)));

    assert_eq!(*sizes.lock().unwrap(), vec![0, 1]);
    assert!(store.get_state().list[0].resolved);
  }

  #[test]
  fn test_dispatch_from_listener_waits_for_other_listeners() {
    let store = store();
    let handle = store.clone();
    let _first = store.subscribe(move |state| {
      if state.list.len() == 1 {
        handle.dispatch(bug_added(Bug::new(2, "b")));
      }
    });

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_listener = seen.clone();
    let _second = store.subscribe(move |state| {
      seen_in_listener.lock().unwrap().push(state.list.len());
    });

    store.dispatch(bug_added(Bug::new(1, "a")));

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(store.get_state().list.len(), 2);
  }

  #[test]
  fn test_concurrent_dispatches_notify_in_commit_order() {
    let store = store();
    let (entered_tx, entered_rx) = std::sync::mpsc::channel();
    let entered_tx = Mutex::new(entered_tx);
    let last_seen: Arc<Mutex<Option<Arc<BugsState>>>> = Arc::new(Mutex::new(None));
    let last_in_listener = last_seen.clone();

    let _sub = store.subscribe(move |state| {
      if state.list.len() == 1 {
        entered_tx.lock().unwrap().send(()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(100));
      }
      *last_in_listener.lock().unwrap() = Some(state.clone());
    });

    let first = {
      let store = store.clone();
      std::thread::spawn(move || store.dispatch(bug_added(Bug::new(1, "a"))))
    };
    entered_rx.recv().unwrap();
    store.dispatch(bug_added(Bug::new(2, "b")));
    first.join().unwrap();

    let last = last_seen.lock().unwrap().clone().unwrap();
    assert_eq!(last.list.len(), 2);
    assert!(Arc::ptr_eq(&last, &store.get_state()));
  }

  #[test]
  fn test_middleware_sees_state_left_by_previous_dispatch() {
    struct Sizes(Arc<Mutex<Vec<usize>>>);
    impl Middleware for Sizes {
      fn process(&self, action: Action, state: &BugsState, next: Next<'_>) {
        self.0.lock().unwrap().push(state.list.len());
        next.run(action);
      }
    }

    let sizes = Arc::new(Mutex::new(Vec::new()));
    let store = Store::builder(FakeBugApi::new())
      .middleware(Sizes(sizes.clone()))
      .build();
    let handle = store.clone();
    let _sub = store.subscribe(move |state| {
      if state.list.len() == 1 {
        handle.dispatch(bug_added(Bug::new(2, "b")));
      }
    });

    store.dispatch(bug_added(Bug::new(1, "a")));

    assert_eq!(*sizes.lock().unwrap(), vec![0, 1]);
  }
}
