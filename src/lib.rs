//! # Session Items
//!
//! Change-tracking storage for session variables backed by a remote
//! key-value cache.
//!
//! ## Core Concepts
//!
//! - **Items**: an ordered, case-insensitive map of session variables
//! - **Snapshots**: raw payloads loaded from the store, decoded on first read
//! - **Change tracking**: modified and deleted keys since the last save
//! - **Codec**: checksummed value frames in MessagePack or JSON
//!
//! ## Example
//!
//! ```ignore
//! use session_items::{ItemsConfig, SessionItems, SessionValue};
//!
//! let mut items = SessionItems::from_snapshot(ItemsConfig::default(), snapshot);
//!
//! // Immutable kinds can be read without dirtying the session.
//! let user = items.get("user")?;
//!
//! items.set("cart_size", 3);
//! items.remove("promo");
//!
//! // Write back only what changed.
//! let changes = items.changes()?;
//! connector.persist(&changes)?;
//! items.set_dirty(false);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod items;
pub mod policy;
pub mod types;

// Re-exports
pub use codec::{CodecConfig, ValueCodec};
pub use config::ItemsConfig;
pub use error::{Result, SessionError};
pub use items::{ChangeSet, EntryState, SessionEntry, SessionItems};
pub use policy::MutabilityPolicy;
pub use types::*;
