//! Scripted in-memory `BugApi` for tests.
//!
//! Routes are matched in registration order; a `once` route is consumed by
//! the first request that hits it. Unmatched requests fail with 404.

use crate::api::client::BugApi;
use crate::api::types::{Bug, BugId, BugPatch, NewBug};
use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Notify};

/// What the fake server answers with
#[derive(Debug, Clone)]
pub enum Reply {
  Json(Value),
  Status(u16),
  NetworkError,
}

/// A request as seen by the fake server
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
  pub method: &'static str,
  pub path: String,
  pub body: Option<Value>,
}

struct Route {
  method: &'static str,
  path: String,
  reply: Reply,
  once: bool,
}

struct FakeInner {
  routes: Mutex<Vec<Route>>,
  history: Mutex<Vec<Recorded>>,
  gate: watch::Sender<bool>,
  requested: Notify,
}

#[derive(Clone)]
pub struct FakeBugApi {
  inner: Arc<FakeInner>,
}

impl FakeBugApi {
  pub fn new() -> Self {
    let (gate, _) = watch::channel(true);
    Self {
      inner: Arc::new(FakeInner {
        routes: Mutex::new(Vec::new()),
        history: Mutex::new(Vec::new()),
        gate,
        requested: Notify::new(),
      }),
    }
  }

  /// Answer every `method path` request with `reply`
  pub fn on(&self, method: &'static str, path: &str, reply: Reply) -> &Self {
    self.add_route(method, path, reply, false)
  }

  /// Answer the next `method path` request with `reply`
  pub fn on_once(&self, method: &'static str, path: &str, reply: Reply) -> &Self {
    self.add_route(method, path, reply, true)
  }

  fn add_route(&self, method: &'static str, path: &str, reply: Reply, once: bool) -> &Self {
    self.inner.routes.lock().unwrap().push(Route {
      method,
      path: path.to_string(),
      reply,
      once,
    });
    self
  }

  /// Keep incoming requests in flight until `release` is called
  pub fn hold(&self) {
    self.inner.gate.send_replace(false);
  }

  pub fn release(&self) {
    self.inner.gate.send_replace(true);
  }

  /// Resolves once at least one request has been recorded
  pub async fn wait_for_request(&self) {
    self.wait_for_requests(1).await;
  }

  pub async fn wait_for_requests(&self, n: usize) {
    while self.history().len() < n {
      self.inner.requested.notified().await;
    }
  }

  pub fn history(&self) -> Vec<Recorded> {
    self.inner.history.lock().unwrap().clone()
  }

  pub fn count(&self, method: &str) -> usize {
    self
      .history()
      .iter()
      .filter(|r| r.method == method)
      .count()
  }

  fn record(&self, method: &'static str, path: &str, body: Option<Value>) {
    self.inner.history.lock().unwrap().push(Recorded {
      method,
      path: path.to_string(),
      body,
    });
    self.inner.requested.notify_one();
  }

  fn take_reply(&self, method: &str, path: &str) -> Reply {
    let mut routes = self.inner.routes.lock().unwrap();
    let Some(idx) = routes
      .iter()
      .position(|r| r.method == method && r.path == path)
    else {
      return Reply::Status(404);
    };
    if routes[idx].once {
      routes.remove(idx).reply
    } else {
      routes[idx].reply.clone()
    }
  }

  async fn respond<T: DeserializeOwned>(
    &self,
    method: &'static str,
    path: String,
    body: Option<Value>,
  ) -> Result<T> {
    match self.exchange(method, &path, body).await? {
      Some(value) => serde_json::from_value(value)
        .map_err(|e| eyre!("Failed to parse response from {} {}: {}", method, path, e)),
      None => Err(eyre!("Failed to parse response from {} {}: empty body", method, path)),
    }
  }

  /// Record the request, wait for the gate, then answer. A 2xx `Status`
  /// reply succeeds with no body.
  async fn exchange(
    &self,
    method: &'static str,
    path: &str,
    body: Option<Value>,
  ) -> Result<Option<Value>> {
    self.record(method, path, body);

    let mut gate = self.inner.gate.subscribe();
    loop {
      let open = *gate.borrow_and_update();
      if open || gate.changed().await.is_err() {
        break;
      }
    }

    match self.take_reply(method, path) {
      Reply::Json(value) => Ok(Some(value)),
      Reply::Status(code) if (200..300).contains(&code) => Ok(None),
      Reply::Status(code) => Err(eyre!("{} {} returned {}", method, path, code)),
      Reply::NetworkError => Err(eyre!("{} {} failed: connection refused", method, path)),
    }
  }
}

impl BugApi for FakeBugApi {
  fn list_bugs(&self) -> BoxFuture<'_, Result<Vec<Bug>>> {
    self.respond("GET", "bugs".to_string(), None).boxed()
  }

  fn create_bug(&self, bug: NewBug) -> BoxFuture<'_, Result<Bug>> {
    let body = serde_json::to_value(&bug).ok();
    self.respond("POST", "bugs".to_string(), body).boxed()
  }

  fn patch_bug(&self, id: BugId, patch: BugPatch) -> BoxFuture<'_, Result<()>> {
    let body = serde_json::to_value(&patch).ok();
    async move {
      self.exchange("PATCH", &format!("bugs/{}", id), body).await?;
      Ok(())
    }
    .boxed()
  }
}
