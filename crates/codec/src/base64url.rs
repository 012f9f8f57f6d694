//! URL-safe base64 without padding.
//!
//! Decoding tolerates surrounding whitespace (tokens are usually pasted) and trailing `=`
//! padding, but nothing else outside the `A-Za-z0-9-_` alphabet.

use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use crate::error::{CodecError, Result};

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    TOKEN_ENGINE.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>> {
    TOKEN_ENGINE
        .decode(text.trim().as_bytes())
        .map_err(|err| CodecError::malformed(err.to_string()))
}
