//! Client-side entity store for bugs.
//!
//! - `reducer` applies plain actions to produce a new `BugsState`
//! - `dispatcher` runs actions through middleware and notifies subscribers
//! - `thunk` performs server round-trips and dispatches on confirmation
//! - `selectors` derive views of the state

pub mod action;
mod dispatcher;
pub mod middleware;
mod reducer;
pub mod selectors;
mod state;
mod thunk;

pub use dispatcher::{Store, Subscription};
pub use state::{BugsState, Freshness};
