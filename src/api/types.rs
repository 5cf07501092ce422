//! Wire types for the `bugs` resource.
//!
//! These double as domain types: the store keeps `Bug` values exactly as the
//! server last confirmed them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned bug identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BugId(pub u64);

impl fmt::Display for BugId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Identifier of the user a bug is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A bug as confirmed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
  pub id: BugId,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub resolved: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<UserId>,
}

impl Bug {
  #[cfg(test)]
  pub fn new(id: u64, description: impl Into<String>) -> Self {
    Self {
      id: BugId(id),
      description: description.into(),
      resolved: false,
      user_id: None,
    }
  }
}

/// Payload for creating a bug. Has no id; the server assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBug {
  pub description: String,
}

impl NewBug {
  pub fn new(description: impl Into<String>) -> Self {
    Self {
      description: description.into(),
    }
  }
}

/// Partial update sent with PATCH. Unset fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BugPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resolved: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<UserId>,
}

impl BugPatch {
  pub fn resolve() -> Self {
    Self {
      resolved: Some(true),
      ..Self::default()
    }
  }

  pub fn assign(user_id: UserId) -> Self {
    Self {
      user_id: Some(user_id),
      ..Self::default()
    }
  }
}
