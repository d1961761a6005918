//! Mutability policy for read tracking.
//!
//! A value handed out by a read may be edited in place by the caller with
//! no further notice to the collection. Reads of kinds outside the
//! immutable allowlist therefore mark the key modified, accepting an
//! occasional needless write-back.

use crate::types::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Allowlist of value kinds whose reads never dirty a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutabilityPolicy {
    immutable: BTreeSet<ValueKind>,
}

impl Default for MutabilityPolicy {
    /// Null, bool, fixed-width numbers, char and text.
    fn default() -> Self {
        let immutable = ValueKind::ALL
            .into_iter()
            .filter(|kind| {
                kind.is_numeric()
                    || matches!(
                        kind,
                        ValueKind::Null | ValueKind::Bool | ValueKind::Char | ValueKind::Text
                    )
            })
            .collect();
        Self { immutable }
    }
}

impl MutabilityPolicy {
    /// Policy treating every kind as mutable, so every read dirties.
    pub fn all_mutable() -> Self {
        Self {
            immutable: BTreeSet::new(),
        }
    }

    /// Add a kind to the allowlist.
    pub fn with_immutable(mut self, kind: ValueKind) -> Self {
        self.immutable.insert(kind);
        self
    }

    /// Remove a kind from the allowlist.
    pub fn without_immutable(mut self, kind: ValueKind) -> Self {
        self.immutable.remove(&kind);
        self
    }

    pub fn is_immutable(&self, kind: ValueKind) -> bool {
        self.immutable.contains(&kind)
    }

    /// Whether reading a value of this kind must mark its key modified.
    pub fn read_marks_modified(&self, kind: ValueKind) -> bool {
        !self.is_immutable(kind)
    }

    pub fn immutable_kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.immutable.iter().copied()
    }
}
