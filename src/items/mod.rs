//! Change-tracking session items.
//!
//! A [`SessionItems`] collection is restored from a store snapshot at the
//! start of a request, used by application code during the request, and
//! asked for its [`ChangeSet`] at the end so only changed keys go back to
//! the remote cache.

mod changes;
mod collection;
mod keys;

pub use changes::ChangeSet;
pub use collection::{EntryState, SessionEntry, SessionItems};
