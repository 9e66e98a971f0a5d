//! Token-length estimation over a fixed cl100k BPE vocabulary.

use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::models::EncodedResponse;

/// Encode `text` with the cl100k vocabulary. Deterministic; `""` encodes to
/// an empty id sequence.
pub fn encode(text: &str) -> Result<EncodedResponse> {
    let bpe = tiktoken_rs::cl100k_base().map_err(|e| Error::TokenizerUnavailable(e.to_string()))?;
    let ids = bpe.encode_ordinary(text);
    Ok(EncodedResponse {
        original_text: text.to_string(),
        token_length: ids.len(),
        encoded_text: ids,
    })
}

/// Start encoding on the blocking pool and hand the single result back over
/// a oneshot channel. The caller keeps doing its own bookkeeping and awaits
/// the receiver at the point the count is needed, which is always before the
/// generation call.
pub fn spawn_encode(text: String) -> oneshot::Receiver<Result<EncodedResponse>> {
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        // the receiver may be gone if the pipeline died first
        let _ = tx.send(encode(&text));
    });
    rx
}
