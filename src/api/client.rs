use crate::api::types::{Bug, BugId, BugPatch, NewBug};
use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Transport for the `bugs` resource.
///
/// Implementations report any failure (network error, non-2xx status,
/// unparseable body) as an `Err`; callers do not distinguish between them.
pub trait BugApi: Send + Sync {
  /// `GET bugs`
  fn list_bugs(&self) -> BoxFuture<'_, Result<Vec<Bug>>>;

  /// `POST bugs`, returning the stored bug with its server-assigned id
  fn create_bug(&self, bug: NewBug) -> BoxFuture<'_, Result<Bug>>;

  /// `PATCH bugs/{id}`. Any 2xx counts as applied; the body is not read.
  fn patch_bug(&self, id: BugId, patch: BugPatch) -> BoxFuture<'_, Result<()>>;
}

/// REST client for the bug tracker server
#[derive(Clone)]
pub struct HttpBugApi {
  client: Client,
  base: Url,
  token: Option<String>,
}

impl HttpBugApi {
  pub fn new(config: &Config) -> Result<Self> {
    let api = Self::build(
      &config.api.url,
      Duration::from_secs(config.api.timeout_secs),
    )?;

    Ok(match Config::get_api_token() {
      Some(token) => api.with_token(token),
      None => api,
    })
  }

  /// Client for `url` with a short timeout and no auth
  #[cfg(test)]
  pub fn with_base_url(url: &str) -> Result<Self> {
    Self::build(url, Duration::from_secs(5))
  }

  /// Send `Authorization: Bearer <token>` with every request
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  fn build(url: &str, timeout: Duration) -> Result<Self> {
    let base = base_url(url)?;

    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      base,
      token: None,
    })
  }

  pub fn base(&self) -> &Url {
    &self.base
  }

  async fn send<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<T> {
    let response = self.execute(method.clone(), path, body).await?;
    let url = response.url().clone();
    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {} {}: {}", method, url, e))
  }

  /// Send the request and fail on transport errors or a non-2xx status
  async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
    let url = self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid resource path {}: {}", path, e))?;

    let mut request = self.client.request(method.clone(), url.clone());
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("{} {} failed: {}", method, url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("{} {} returned {}", method, url, status));
    }
    Ok(response)
  }
}

impl BugApi for HttpBugApi {
  fn list_bugs(&self) -> BoxFuture<'_, Result<Vec<Bug>>> {
    self.send(Method::GET, "bugs", None).boxed()
  }

  fn create_bug(&self, bug: NewBug) -> BoxFuture<'_, Result<Bug>> {
    async move {
      let body = serde_json::to_value(&bug)?;
      self.send(Method::POST, "bugs", Some(body)).await
    }
    .boxed()
  }

  fn patch_bug(&self, id: BugId, patch: BugPatch) -> BoxFuture<'_, Result<()>> {
    async move {
      let path = format!("bugs/{}", id);
      let body = serde_json::to_value(&patch)?;
      self.execute(Method::PATCH, &path, Some(body)).await?;
      Ok(())
    }
    .boxed()
  }
}

/// Parse the configured base URL so that relative resource paths join
/// beneath it (`http://host/api` + `bugs` = `http://host/api/bugs`).
fn base_url(raw: &str) -> Result<Url> {
  let mut url = Url::parse(raw).map_err(|e| eyre!("Invalid API url {}: {}", raw, e))?;
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}
