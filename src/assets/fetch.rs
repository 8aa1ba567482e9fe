//! Two-path frame loader: remote HTTPS fetch by default, local file as the
//! manual fallback. Both paths yield raw bytes for the shared decode path.

use std::io::Read as _;
use std::path::Path;

use anyhow::Context as _;

use crate::error::{FramefitError, FramefitResult};

/// Hard cap on the remote frame payload.
const MAX_FETCH_BYTES: u64 = 32 * 1024 * 1024;

/// Fetch the frame asset with an anonymous GET.
///
/// Failure is non-fatal for the session: the caller surfaces the degraded
/// state and accepts a local frame file through [`load_local`] instead.
pub fn fetch_remote(url: &str) -> FramefitResult<Vec<u8>> {
    tracing::info!(url, "fetching remote frame");
    let resp = ureq::get(url)
        .call()
        .map_err(|e| FramefitError::fetch(format!("GET {url}: {e}")))?;

    let mut bytes = Vec::new();
    resp.into_reader()
        .take(MAX_FETCH_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|e| FramefitError::fetch(format!("read body of {url}: {e}")))?;

    if bytes.is_empty() {
        return Err(FramefitError::fetch(format!("empty response from {url}")));
    }
    tracing::debug!(url, len = bytes.len(), "remote frame fetched");
    Ok(bytes)
}

/// Read a locally supplied asset file (photo or frame).
pub fn load_local(path: &Path) -> FramefitResult<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    Ok(bytes)
}
