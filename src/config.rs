//! Configuration for session item collections.

use crate::codec::CodecConfig;
use crate::error::{Result, SessionError};
use crate::policy::MutabilityPolicy;
use crate::types::{PayloadEncoding, ValueKind};
use serde::{Deserialize, Serialize};

/// Configuration for a [`SessionItems`](crate::items::SessionItems) collection.
///
/// Deserializable so an adapter can embed it in its own configuration:
///
/// ```json
/// { "codec": { "encoding": "json" }, "policy": { "immutable": ["text", "bool"] } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemsConfig {
    /// Value codec settings.
    pub codec: CodecConfig,

    /// Which value kinds may be read without dirtying their key.
    pub policy: MutabilityPolicy,
}

impl ItemsConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SessionError::InvalidConfig(e.to_string()))
    }

    /// Set the body encoding used for written values.
    pub fn with_encoding(mut self, encoding: PayloadEncoding) -> Self {
        self.codec.encoding = encoding;
        self
    }

    /// Replace the mutability policy.
    pub fn with_policy(mut self, policy: MutabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Treat reads of `kind` as side-effect free.
    pub fn with_immutable(mut self, kind: ValueKind) -> Self {
        self.policy = self.policy.with_immutable(kind);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ItemsConfig::default();
        assert_eq!(config.codec.encoding, PayloadEncoding::MessagePack);
        assert_eq!(config.policy, MutabilityPolicy::default());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ItemsConfig::from_json(r#"{"codec": {"encoding": "json"}}"#).unwrap();
        assert_eq!(config.codec.encoding, PayloadEncoding::Json);
        assert_eq!(config.policy, MutabilityPolicy::default());
    }

    #[test]
    fn test_from_json_empty_object() {
        assert_eq!(ItemsConfig::from_json("{}").unwrap(), ItemsConfig::default());
    }

    #[test]
    fn test_from_json_invalid() {
        let result = ItemsConfig::from_json(r#"{"codec": {"encoding": "xml"}}"#);
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder() {
        let config = ItemsConfig::new()
            .with_encoding(PayloadEncoding::Json)
            .with_policy(MutabilityPolicy::all_mutable())
            .with_immutable(ValueKind::Bool);

        assert_eq!(config.codec.encoding, PayloadEncoding::Json);
        assert!(config.policy.is_immutable(ValueKind::Bool));
        assert!(!config.policy.is_immutable(ValueKind::Text));
    }
}
