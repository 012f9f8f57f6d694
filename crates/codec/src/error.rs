use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while turning bundles into tokens and back
#[derive(Error, Debug)]
pub enum CodecError {
    /// Token is empty, uses characters outside the URL-safe alphabet, or has an impossible length
    #[error("Malformed token: {0}")]
    MalformedInput(String),

    /// The compression transform rejected its input.
    ///
    /// `BundleCodec::decode` recovers from this by treating the bytes as literal JSON, so
    /// callers of the codec never see it; it only escapes from direct adapter calls.
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    /// The compression transform could not produce output
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    /// Decoded bytes are not a serialized bundle
    #[error("Decode error: {0}")]
    ParseFailed(#[source] serde_json::Error),

    /// The value handed to `encode` cannot be represented as a bundle
    #[error("Value cannot be encoded as a bundle: {0}")]
    NonSerializable(String),

    /// Serialized payload exceeds the configured limit
    #[error("Payload too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },
}

impl CodecError {
    /// Create a malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create a non-serializable value error
    pub fn non_serializable(msg: impl Into<String>) -> Self {
        Self::NonSerializable(msg.into())
    }

    /// True for every error `decode` can surface: the token did not yield a bundle.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput(_) | Self::ParseFailed(_) | Self::PayloadTooLarge { .. }
        )
    }
}
