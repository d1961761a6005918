//! Change-tracking session item collection.

use super::changes::ChangeSet;
use super::keys::{fold_key, KeySet};
use crate::codec::ValueCodec;
use crate::config::ItemsConfig;
use crate::error::{Result, SessionError};
use crate::policy::MutabilityPolicy;
use crate::types::SessionValue;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// Storage state of a single entry.
#[derive(Clone, Debug, PartialEq)]
pub enum EntryState {
    /// Payload as loaded from the store, not yet decoded. `None` is a stored null.
    Raw(Option<Vec<u8>>),

    /// Decoded value.
    Materialized(SessionValue),
}

impl EntryState {
    pub fn is_raw(&self) -> bool {
        matches!(self, EntryState::Raw(_))
    }

    /// Decode in place if still raw. A failed decode leaves the state raw.
    fn materialize(&mut self, codec: &ValueCodec) -> Result<&mut SessionValue> {
        if let EntryState::Raw(bytes) = self {
            let value = codec.decode(bytes.as_deref())?;
            *self = EntryState::Materialized(value);
        }

        match self {
            EntryState::Materialized(value) => Ok(value),
            EntryState::Raw(_) => unreachable!("raw entry was materialized above"),
        }
    }
}

/// A session variable and its storage state.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionEntry {
    /// Canonical casing (as first inserted).
    pub key: String,
    pub state: EntryState,
}

/// Ordered, case-insensitive collection of session variables that tracks
/// which keys changed since it was loaded.
///
/// Keys compare case-insensitively and keep the casing they were first
/// inserted with. Values loaded through [`load_snapshot`](Self::load_snapshot)
/// stay encoded until read. Writes mark keys modified; reads mark keys
/// modified only when the value's kind is outside the configured immutable
/// allowlist, since the caller may still change such a value in place.
#[derive(Clone, Debug)]
pub struct SessionItems {
    /// Entries in insertion order.
    entries: Vec<SessionEntry>,

    /// Folded key -> position in `entries`.
    index: HashMap<String, usize>,

    /// Keys written or handed out as mutable since the last reset.
    modified: KeySet,

    /// Keys removed since the last reset.
    deleted: KeySet,

    /// Set by `set_dirty(true)`.
    dirty_override: bool,

    codec: ValueCodec,
    policy: MutabilityPolicy,
}

impl Default for SessionItems {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionItems {
    /// Create an empty collection with default configuration.
    pub fn new() -> Self {
        Self::with_config(ItemsConfig::default())
    }

    /// Create an empty collection.
    pub fn with_config(config: ItemsConfig) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            modified: KeySet::default(),
            deleted: KeySet::default(),
            dirty_override: false,
            codec: ValueCodec::new(config.codec),
            policy: config.policy,
        }
    }

    /// Restore a collection from a store snapshot. Nothing is decoded and
    /// the result is not dirty.
    pub fn from_snapshot<I, K>(config: ItemsConfig, snapshot: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<Vec<u8>>)>,
        K: AsRef<str>,
    {
        let mut items = Self::with_config(config);
        for (key, bytes) in snapshot {
            items.load_snapshot(key.as_ref(), bytes);
        }
        debug!(count = items.len(), "restored session items from snapshot");
        items
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub fn policy(&self) -> &MutabilityPolicy {
        &self.policy
    }

    // --- Lookup ---

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(&fold_key(key)).copied()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(SessionError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    /// Materialize the entry at `pos` and apply read/write tracking.
    fn fetch(&mut self, pos: usize, mutable: bool) -> Result<&mut SessionValue> {
        let entry = &mut self.entries[pos];
        let was_raw = entry.state.is_raw();

        let value = match entry.state.materialize(&self.codec) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %entry.key, error = %e, "failed to materialize session item");
                return Err(e);
            }
        };

        let kind = value.kind();
        let marks_modified = mutable || self.policy.read_marks_modified(kind);
        if marks_modified {
            self.modified.insert(&entry.key);
        }

        if was_raw {
            debug!(
                key = %entry.key,
                kind = %kind,
                modified = marks_modified,
                "materialized session item"
            );
        }

        Ok(value)
    }

    /// Look up a value case-insensitively, decoding it on first access.
    ///
    /// Returns `Ok(None)` for an absent key. Reading a value whose kind is
    /// not immutable under the policy marks the key modified.
    pub fn get(&mut self, key: &str) -> Result<Option<&SessionValue>> {
        match self.position(key) {
            Some(pos) => Ok(Some(&*self.fetch(pos, false)?)),
            None => Ok(None),
        }
    }

    /// Look up a value for in-place editing. Always marks the key modified.
    pub fn get_mut(&mut self, key: &str) -> Result<Option<&mut SessionValue>> {
        match self.position(key) {
            Some(pos) => Ok(Some(self.fetch(pos, true)?)),
            None => Ok(None),
        }
    }

    /// Positional form of [`get`](Self::get).
    pub fn get_at(&mut self, index: usize) -> Result<&SessionValue> {
        self.check_index(index)?;
        Ok(&*self.fetch(index, false)?)
    }

    /// Positional form of [`get_mut`](Self::get_mut).
    pub fn get_at_mut(&mut self, index: usize) -> Result<&mut SessionValue> {
        self.check_index(index)?;
        self.fetch(index, true)
    }

    /// Look up a value and convert it into a serde type.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => value.deserialize_into().map(Some),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Canonical key at a position.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.key.as_str())
    }

    /// Storage state of an entry, without decoding it.
    pub fn entry_state(&self, key: &str) -> Option<&EntryState> {
        self.position(key).map(|pos| &self.entries[pos].state)
    }

    // --- Mutation ---

    /// Insert or overwrite a value.
    ///
    /// New keys are appended to enumeration order. An existing key matched
    /// under different casing keeps its original casing. Setting a key
    /// removed earlier in the same lifetime counts as a modification.
    pub fn set(&mut self, key: &str, value: impl Into<SessionValue>) {
        let state = EntryState::Materialized(value.into());
        let folded = fold_key(key);

        let pos = match self.index.get(&folded) {
            Some(&pos) => {
                self.entries[pos].state = state;
                pos
            }
            None => {
                self.entries.push(SessionEntry {
                    key: key.to_string(),
                    state,
                });
                let pos = self.entries.len() - 1;
                self.index.insert(folded, pos);
                pos
            }
        };

        self.mark_written(pos);
    }

    /// Overwrite the value at a position.
    pub fn set_at(&mut self, index: usize, value: impl Into<SessionValue>) -> Result<()> {
        self.check_index(index)?;
        self.entries[index].state = EntryState::Materialized(value.into());
        self.mark_written(index);
        Ok(())
    }

    fn mark_written(&mut self, pos: usize) {
        let key = &self.entries[pos].key;
        self.deleted.remove(key);
        self.modified.insert(key);
        trace!(key = %key, "set session item");
    }

    /// Bulk-load primitive: store an undecoded payload without touching
    /// change tracking. `None` is a stored null.
    pub fn load_snapshot(&mut self, key: &str, bytes: Option<Vec<u8>>) {
        let state = EntryState::Raw(bytes);
        let folded = fold_key(key);

        match self.index.get(&folded) {
            Some(&pos) => self.entries[pos].state = state,
            None => {
                self.entries.push(SessionEntry {
                    key: key.to_string(),
                    state,
                });
                self.index.insert(folded, self.entries.len() - 1);
            }
        }

        trace!(key, "loaded raw session item");
    }

    /// Remove a key. Returns `false`, changing nothing, if it was absent.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(pos) => {
                self.remove_position(pos);
                true
            }
            None => false,
        }
    }

    /// Remove the entry at a position.
    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.remove_position(index);
        Ok(())
    }

    fn remove_position(&mut self, pos: usize) {
        let entry = self.entries.remove(pos);
        self.index.remove(&fold_key(&entry.key));
        for p in self.index.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }

        self.modified.remove(&entry.key);
        self.deleted.insert(&entry.key);
        trace!(key = %entry.key, "removed session item");
    }

    /// Remove every entry. All present keys become deleted.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.deleted.insert(&entry.key);
        }
        self.index.clear();
        self.modified.clear();
        trace!(deleted = self.deleted.len(), "cleared session items");
    }

    // --- Change tracking ---

    /// Keys written, or read as mutable, since the last reset.
    pub fn modified_keys(&self) -> BTreeSet<String> {
        self.modified.snapshot()
    }

    /// Keys removed since the last reset.
    pub fn deleted_keys(&self) -> BTreeSet<String> {
        self.deleted.snapshot()
    }

    pub fn is_modified(&self, key: &str) -> bool {
        self.modified.contains(key)
    }

    pub fn is_deleted(&self, key: &str) -> bool {
        self.deleted.contains(key)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_override || !self.modified.is_empty() || !self.deleted.is_empty()
    }

    /// `false` resets change tracking, keeping every entry and its decoded
    /// value. `true` only raises the dirty flag.
    pub fn set_dirty(&mut self, dirty: bool) {
        if dirty {
            self.dirty_override = true;
        } else {
            self.modified.clear();
            self.deleted.clear();
            self.dirty_override = false;
        }
    }

    /// Encode the pending delta. Tracking is left as is; reset it with
    /// `set_dirty(false)` once the delta is persisted.
    pub fn changes(&self) -> Result<ChangeSet> {
        let mut upserts = Vec::with_capacity(self.modified.len());
        for entry in &self.entries {
            if !self.modified.contains(&entry.key) {
                continue;
            }
            let bytes = match &entry.state {
                EntryState::Raw(bytes) => bytes.clone(),
                EntryState::Materialized(value) => self.codec.encode_nullable(value)?,
            };
            upserts.push((entry.key.clone(), bytes));
        }

        let changes = ChangeSet {
            upserts,
            deletions: self.deleted.snapshot().into_iter().collect(),
        };

        debug!(
            upserts = changes.upserts.len(),
            deletions = changes.deletions.len(),
            bytes = changes.payload_bytes(),
            "computed session item changes"
        );

        Ok(changes)
    }

    // --- Enumeration ---

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical keys in insertion order. Never decodes.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Keys with their storage state, in insertion order. Never decodes.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntryState)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), &e.state))
    }

    /// Owned copy of the keys, for loops that read values while iterating.
    pub fn key_list(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a SessionItems {
    type Item = &'a SessionEntry;
    type IntoIter = std::slice::Iter<'a, SessionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
