use serde::Serialize;

use crate::base64url;
use crate::compression::CompressionAdapter;
use crate::depth::Bounded;
use crate::error::{CodecError, Result};
use crate::Bundle;

/// Default cap on the serialized JSON size, before compression / after decompression.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Deepest nesting `encode` accepts.
///
/// Kept below the JSON parser's recursion limit so every token we produce can be decoded.
/// Enforced while serializing, so cyclic `Rc` graphs fail instead of recursing forever.
pub const MAX_BUNDLE_DEPTH: usize = 100;

/// Token plus what the encoder did to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBundle {
    pub token: String,
    /// Whether the token carries compressed bytes (false: raw JSON)
    pub compressed: bool,
    /// Size of the serialized JSON
    pub json_bytes: usize,
}

/// JSON value <-> opaque URL-safe token.
///
/// `encode`: compact JSON -> compress (kept only if smaller) -> base64url.
/// `decode`: base64url -> decompress or pass through -> JSON. Either a complete bundle comes
/// back or an error does.
#[derive(Debug, Clone)]
pub struct BundleCodec {
    compression: CompressionAdapter,
    max_payload_bytes: usize,
}

impl Default for BundleCodec {
    fn default() -> Self {
        Self::new(CompressionAdapter::detect())
    }
}

impl BundleCodec {
    #[must_use]
    pub fn new(compression: CompressionAdapter) -> Self {
        Self {
            compression,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit.max(1);
        self
    }

    #[must_use]
    pub fn compression(&self) -> &CompressionAdapter {
        &self.compression
    }

    #[must_use]
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    pub async fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<EncodedBundle> {
        let json = serde_json::to_vec(&Bounded::new(value, MAX_BUNDLE_DEPTH))
            .map_err(|err| CodecError::non_serializable(err.to_string()))?;
        let json_bytes = json.len();
        if json_bytes > self.max_payload_bytes {
            return Err(CodecError::PayloadTooLarge {
                limit: self.max_payload_bytes,
            });
        }

        let packed = if self.compression.is_available() {
            match self.compression.compress(&json).await {
                Ok(packed) if packed.len() < json.len() => Some(packed),
                Ok(_) => None,
                Err(err) => {
                    log::debug!("compression failed ({err}); storing raw JSON");
                    None
                }
            }
        } else {
            None
        };

        let compressed = packed.is_some();
        let payload = packed.unwrap_or(json);
        log::debug!(
            "encoded bundle: {json_bytes} JSON bytes -> {} payload bytes via {}",
            payload.len(),
            if compressed {
                self.compression.transform_name()
            } else {
                "identity"
            }
        );
        Ok(EncodedBundle {
            token: base64url::encode(&payload),
            compressed,
            json_bytes,
        })
    }

    pub async fn decode(&self, token: &str) -> Result<Bundle> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CodecError::malformed("token is empty"));
        }
        let bytes = base64url::decode(token)?;
        let payload = self
            .compression
            .decompress(&bytes, self.max_payload_bytes)
            .await?;
        if payload.len() > self.max_payload_bytes {
            return Err(CodecError::PayloadTooLarge {
                limit: self.max_payload_bytes,
            });
        }
        serde_json::from_slice(&payload).map_err(CodecError::ParseFailed)
    }
}

/// Encode with the default codec.
pub async fn encode_bundle<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(BundleCodec::default().encode(value).await?.token)
}

/// Decode with the default codec.
pub async fn decode_bundle(token: &str) -> Result<Bundle> {
    BundleCodec::default().decode(token).await
}
