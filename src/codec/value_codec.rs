//! Value frame encoding and decoding.

use crate::error::{Result, SessionError};
use crate::types::{PayloadEncoding, SessionValue};
use serde::{Deserialize, Serialize};

/// Magic bytes for encoded values.
const VALUE_MAGIC: &[u8; 4] = b"SSV\0";

/// Current value frame format version.
const VALUE_VERSION: u8 = 1;

/// Magic + version + encoding tag.
const HEADER_SIZE: usize = 6;

/// CRC32 of the body.
const TRAILER_SIZE: usize = 4;

/// Codec configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Body encoding used when writing. Reading accepts either encoding.
    pub encoding: PayloadEncoding,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body encoding used for new frames.
    pub fn with_encoding(mut self, encoding: PayloadEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Converts session values to and from byte frames.
///
/// Frame layout:
///
/// ```text
/// "SSV\0" | version u8 | encoding u8 | body | crc32(body) u32 LE
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueCodec {
    config: CodecConfig,
}

impl ValueCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a value into a frame.
    ///
    /// `SessionValue::Null` produces a full frame, never an empty sequence.
    pub fn encode(&self, value: &SessionValue) -> Result<Vec<u8>> {
        let body = match self.config.encoding {
            PayloadEncoding::MessagePack => rmp_serde::to_vec(value)?,
            PayloadEncoding::Json => {
                // JSON writes NaN and infinities as `null`, which would not decode.
                if !is_json_representable(value) {
                    return Err(SessionError::Serialization(
                        "Non-finite float cannot be encoded as JSON".into(),
                    ));
                }
                serde_json::to_vec(value)?
            }
        };

        let mut frame = Vec::with_capacity(HEADER_SIZE + body.len() + TRAILER_SIZE);
        frame.extend_from_slice(VALUE_MAGIC);
        frame.push(VALUE_VERSION);
        frame.push(self.config.encoding.tag());
        frame.extend_from_slice(&body);
        frame.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());

        Ok(frame)
    }

    /// Encode a value for storage, mapping `Null` to a stored null.
    pub fn encode_nullable(&self, value: &SessionValue) -> Result<Option<Vec<u8>>> {
        if value.is_null() {
            Ok(None)
        } else {
            self.encode(value).map(Some)
        }
    }

    /// Decode a stored payload. An absent payload decodes to `Null`.
    pub fn decode(&self, bytes: Option<&[u8]>) -> Result<SessionValue> {
        let Some(bytes) = bytes else {
            return Ok(SessionValue::Null);
        };

        if bytes.len() < HEADER_SIZE + TRAILER_SIZE {
            return Err(SessionError::InvalidFormat(format!(
                "Value frame too short: {} bytes",
                bytes.len()
            )));
        }

        if &bytes[0..4] != VALUE_MAGIC {
            return Err(SessionError::InvalidFormat("Invalid value magic".into()));
        }

        if bytes[4] != VALUE_VERSION {
            return Err(SessionError::InvalidFormat(format!(
                "Unsupported value version: {}",
                bytes[4]
            )));
        }

        let encoding = PayloadEncoding::from_tag(bytes[5]).ok_or_else(|| {
            SessionError::InvalidFormat(format!("Unknown value encoding: {}", bytes[5]))
        })?;

        let body_len = bytes.len() - HEADER_SIZE - TRAILER_SIZE;
        let (body, trailer) = bytes[HEADER_SIZE..].split_at(body_len);
        let mut checksum_bytes = [0u8; 4];
        checksum_bytes.copy_from_slice(trailer);
        let stored_checksum = u32::from_le_bytes(checksum_bytes);
        let computed_checksum = crc32fast::hash(body);

        if stored_checksum != computed_checksum {
            return Err(SessionError::ChecksumMismatch {
                expected: stored_checksum,
                got: computed_checksum,
            });
        }

        match encoding {
            PayloadEncoding::MessagePack => Ok(rmp_serde::from_slice(body)?),
            PayloadEncoding::Json => serde_json::from_slice(body)
                .map_err(|e| SessionError::Deserialization(e.to_string())),
        }
    }
}

fn is_json_representable(value: &SessionValue) -> bool {
    match value {
        SessionValue::F32(v) => v.is_finite(),
        SessionValue::F64(v) => v.is_finite(),
        SessionValue::List(items) => items.iter().all(is_json_representable),
        SessionValue::Map(map) => map.values().all(is_json_representable),
        _ => true,
    }
}
