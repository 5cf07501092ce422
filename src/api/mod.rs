//! REST access to the bug tracker server.

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use client::{BugApi, HttpBugApi};
pub use types::{Bug, BugId, BugPatch, NewBug, UserId};
