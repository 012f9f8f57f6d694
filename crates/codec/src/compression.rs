//! Optional byte compression with literal fallback.
//!
//! Tokens do not record whether compression was applied. The decoder always tries the
//! transform first and, when it rejects the input (or no transform is compiled in), hands the
//! bytes through unchanged. The caller validates the result as JSON, so a wrong guess surfaces
//! as a parse error instead of garbage.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CodecError, Result};

/// A reversible byte-stream transform.
///
/// Implementations buffer internally and return one complete buffer; no partial output is
/// exposed.
#[async_trait]
pub trait ByteTransform: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>>;

    /// Inflate `bytes`, refusing to produce more than `limit` bytes.
    ///
    /// Input the transform does not recognise must yield `CodecError::DecompressionFailed`.
    async fn decompress(&self, bytes: &[u8], limit: usize) -> Result<Vec<u8>>;
}

#[cfg(feature = "gzip")]
pub use gzip::Gzip;

#[cfg(feature = "gzip")]
mod gzip {
    use std::io::{Read, Write};

    use async_trait::async_trait;
    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::ByteTransform;
    use crate::error::{CodecError, Result};

    /// Single-member gzip stream
    #[derive(Debug, Clone, Copy)]
    pub struct Gzip {
        level: Compression,
    }

    impl Gzip {
        #[must_use]
        pub fn new() -> Self {
            Self {
                level: Compression::best(),
            }
        }

        /// Compression level 0-9
        #[must_use]
        pub fn with_level(level: u32) -> Self {
            Self {
                level: Compression::new(level.min(9)),
            }
        }
    }

    impl Default for Gzip {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ByteTransform for Gzip {
        fn name(&self) -> &'static str {
            "gzip"
        }

        async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
            let input = bytes.to_vec();
            let level = self.level;
            tokio::task::spawn_blocking(move || {
                let mut encoder = GzEncoder::new(Vec::new(), level);
                encoder
                    .write_all(&input)
                    .map_err(|err| CodecError::CompressionFailed(err.to_string()))?;
                encoder
                    .finish()
                    .map_err(|err| CodecError::CompressionFailed(err.to_string()))
            })
            .await
            .map_err(|err| CodecError::CompressionFailed(format!("gzip task failed: {err}")))?
        }

        async fn decompress(&self, bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
            let input = bytes.to_vec();
            tokio::task::spawn_blocking(move || {
                let decoder = GzDecoder::new(input.as_slice());
                let mut out = Vec::new();
                decoder
                    .take(limit.saturating_add(1) as u64)
                    .read_to_end(&mut out)
                    .map_err(|err| CodecError::DecompressionFailed(err.to_string()))?;
                if out.len() > limit {
                    return Err(CodecError::PayloadTooLarge { limit });
                }
                Ok(out)
            })
            .await
            .map_err(|err| CodecError::DecompressionFailed(format!("gzip task failed: {err}")))?
        }
    }
}

/// Compression capability as seen by the bundle codec.
///
/// Holds the transform when one is available; without it `compress` is the identity and
/// `decompress` passes bytes through.
#[derive(Clone)]
pub struct CompressionAdapter {
    transform: Option<Arc<dyn ByteTransform>>,
}

impl CompressionAdapter {
    /// Use the transform compiled into this build, if any.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(feature = "gzip")]
        {
            Self::with_transform(Arc::new(Gzip::new()))
        }
        #[cfg(not(feature = "gzip"))]
        {
            Self::unavailable()
        }
    }

    /// No transform: tokens carry raw JSON.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { transform: None }
    }

    #[must_use]
    pub fn with_transform(transform: Arc<dyn ByteTransform>) -> Self {
        Self {
            transform: Some(transform),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.transform.is_some()
    }

    #[must_use]
    pub fn transform_name(&self) -> &'static str {
        self.transform.as_ref().map_or("identity", |t| t.name())
    }

    pub async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        match &self.transform {
            Some(transform) => transform.compress(bytes).await,
            None => Ok(bytes.to_vec()),
        }
    }

    /// Inflate `bytes`, or return them unchanged when the transform rejects them.
    ///
    /// Only `DecompressionFailed` triggers the fallback; exceeding `limit` is terminal.
    pub async fn decompress(&self, bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
        let Some(transform) = &self.transform else {
            return Ok(bytes.to_vec());
        };
        match transform.decompress(bytes, limit).await {
            Ok(out) => Ok(out),
            Err(CodecError::DecompressionFailed(reason)) => {
                log::debug!(
                    "{} rejected payload ({reason}); treating it as uncompressed",
                    transform.name()
                );
                Ok(bytes.to_vec())
            }
            Err(err) => Err(err),
        }
    }
}

impl Default for CompressionAdapter {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Debug for CompressionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionAdapter")
            .field("transform", &self.transform_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysRejects;

    #[async_trait]
    impl ByteTransform for AlwaysRejects {
        fn name(&self) -> &'static str {
            "rejects"
        }

        async fn compress(&self, _bytes: &[u8]) -> Result<Vec<u8>> {
            Err(CodecError::CompressionFailed("broken".to_string()))
        }

        async fn decompress(&self, _bytes: &[u8], _limit: usize) -> Result<Vec<u8>> {
            Err(CodecError::DecompressionFailed("not mine".to_string()))
        }
    }

    #[tokio::test]
    async fn unavailable_adapter_is_identity() {
        let adapter = CompressionAdapter::unavailable();
        assert!(!adapter.is_available());
        assert_eq!(adapter.transform_name(), "identity");
        let out = adapter.compress(b"{\"a\":1}").await.expect("compress");
        assert_eq!(out, b"{\"a\":1}");
        let back = adapter.decompress(&out, 1024).await.expect("decompress");
        assert_eq!(back, b"{\"a\":1}");
    }

    #[tokio::test]
    async fn rejected_input_falls_back_to_literal_bytes() {
        let adapter = CompressionAdapter::with_transform(Arc::new(AlwaysRejects));
        let out = adapter.decompress(b"[1,2]", 1024).await.expect("fallback");
        assert_eq!(out, b"[1,2]");
    }

    #[cfg(feature = "gzip")]
    #[tokio::test]
    async fn gzip_roundtrip() {
        let adapter = CompressionAdapter::detect();
        assert_eq!(adapter.transform_name(), "gzip");
        let input = "abc".repeat(500).into_bytes();
        let packed = adapter.compress(&input).await.expect("compress");
        assert!(packed.len() < input.len());
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
        let unpacked = adapter.decompress(&packed, 4096).await.expect("decompress");
        assert_eq!(unpacked, input);
    }

    #[cfg(feature = "gzip")]
    #[tokio::test]
    async fn gzip_passes_raw_json_through() {
        let adapter = CompressionAdapter::detect();
        let out = adapter
            .decompress(b"{\"raw\":true}", 1024)
            .await
            .expect("fallback");
        assert_eq!(out, b"{\"raw\":true}");
    }

    #[cfg(feature = "gzip")]
    #[tokio::test]
    async fn gzip_enforces_output_limit() {
        let adapter = CompressionAdapter::detect();
        let packed = adapter.compress(&vec![b'x'; 10_000]).await.expect("compress");
        let err = adapter.decompress(&packed, 100).await.unwrap_err();
        assert!(matches!(err, CodecError::PayloadTooLarge { limit: 100 }));
    }

    #[cfg(feature = "gzip")]
    #[tokio::test]
    async fn gzip_transform_rejects_truncated_stream() {
        let gzip = Gzip::new();
        let packed = gzip.compress(&vec![b'y'; 2_000]).await.expect("compress");
        let err = gzip
            .decompress(&packed[..packed.len() / 2], 4096)
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::DecompressionFailed(_)));
    }
}
