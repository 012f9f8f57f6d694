//! Subcommand implementations. Each writes its result to stdout; diagnostics go to the log.

mod codec;
mod commentary;
mod inspect;

use anyhow::{Context, Result};
use troublecode_codec::{Bundle, BundleCodec};

use crate::input::TokenSource;

pub use codec::{run_capture, run_decode, run_encode, CaptureArgs, DecodeArgs, EncodeArgs};
pub use commentary::{run_prompt, run_render, PromptArgs, RenderArgs};
pub use inspect::{run_lookup, run_tree, LookupArgs, TreeArgs};

/// Read a token from `source` and decode it.
async fn decode_from(source: &TokenSource, codec: &BundleCodec) -> Result<Bundle> {
    let token = source.read()?;
    let bundle = codec
        .decode(&token)
        .await
        .context("Failed to decode token")?;
    log::debug!("decoded {}-char token", token.len());
    Ok(bundle)
}
