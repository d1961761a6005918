//! Value codec.
//!
//! Converts a single [`SessionValue`](crate::types::SessionValue) to a
//! self-describing byte frame and back. Frames carry a magic, a version,
//! the body encoding and a CRC32 of the body, so a payload read back from
//! the remote cache is either decoded exactly or rejected.

mod value_codec;

pub use value_codec::{CodecConfig, ValueCodec};
