//! # TroubleCode Codec
//!
//! Turns a JSON-shaped diagnostic bundle into one portable, URL-safe token and back.
//!
//! ```text
//! Bundle (serde_json::Value, insertion-ordered)
//!     │
//!     ├──> compact JSON bytes
//!     ├──> gzip (kept only when smaller; identity when unavailable)
//!     └──> base64url, no padding  ──>  token
//!
//! token
//!     ├──> base64url decode            (MalformedInput)
//!     ├──> gunzip, or bytes as-is      (rejection is never surfaced)
//!     └──> JSON parse                  (ParseFailed)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use troublecode_codec::{decode_bundle, encode_bundle};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bundle = serde_json::json!({ "userError": "blank page", "logs": [] });
//! let token = encode_bundle(&bundle).await.unwrap();
//! assert_eq!(decode_bundle(&token).await.unwrap(), bundle);
//! # }
//! ```

pub mod base64url;
mod bundle;
mod compression;
mod depth;
mod error;

pub use bundle::{
    decode_bundle, encode_bundle, BundleCodec, EncodedBundle, DEFAULT_MAX_PAYLOAD_BYTES,
    MAX_BUNDLE_DEPTH,
};
#[cfg(feature = "gzip")]
pub use compression::Gzip;
pub use compression::{ByteTransform, CompressionAdapter};
pub use error::{CodecError, Result};

/// A decoded bundle. `serde_json` is built with `preserve_order`, so mappings keep their
/// insertion order through every encode/decode.
pub type Bundle = serde_json::Value;
