//! Change sets produced at save time.

/// The delta an adapter writes back to the remote store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Modified keys with their encoded values, in enumeration order.
    /// `None` is a stored null.
    pub upserts: Vec<(String, Option<Vec<u8>>)>,

    /// Removed keys, sorted.
    pub deletions: Vec<String>,
}

impl ChangeSet {
    /// Nothing to write.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }

    /// Number of store operations this change set represents.
    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletions.len()
    }

    /// Total encoded bytes across upserts.
    pub fn payload_bytes(&self) -> usize {
        self.upserts
            .iter()
            .filter_map(|(_, bytes)| bytes.as_ref().map(Vec::len))
            .sum()
    }
}
