// ============================================================
// Layer 4 — Text Encoder
// ============================================================
// Turns labelled examples into fixed-length token sequences.
//
// Every text is:
//   1. tokenised with special tokens (e.g. the trailing </s> of T5)
//   2. truncated to `max_seq_len`
//   3. padded up to the longest sequence in the same call
//
// so all EncodedExamples of one split share one length and the
// batcher can stack them without further padding.
//
// Reference: tokenizers crate documentation (TruncationParams,
//            PaddingParams, encode_batch)

use anyhow::{anyhow, bail, Result};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::data::dataset::EncodedExample;
use crate::domain::example::LabeledExample;

/// Pad tokens tried in order before falling back to id 0
const PAD_CANDIDATES: [&str; 2] = ["<pad>", "[PAD]"];

/// Tokenise, truncate and pad a split.
pub fn encode_examples(
    tokenizer:   &Tokenizer,
    examples:    &[LabeledExample],
    max_seq_len: usize,
) -> Result<Vec<EncodedExample>> {
    if max_seq_len == 0 {
        bail!("max_seq_len must be positive");
    }
    if examples.is_empty() {
        return Ok(Vec::new());
    }

    // Configure a private copy so the caller's tokenizer is untouched
    let mut tokenizer = tokenizer.clone();

    let (pad_id, pad_token) = pad_token(&tokenizer);

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_seq_len,
            ..Default::default()
        }))
        .map_err(|e| anyhow!("Cannot configure truncation: {e}"))?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        pad_id,
        pad_token,
        ..Default::default()
    }));

    let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
    let encodings = tokenizer
        .encode_batch(texts, true)
        .map_err(|e| anyhow!("Tokenisation error: {e}"))?;

    let encoded: Vec<EncodedExample> = encodings
        .iter()
        .zip(examples)
        .map(|(enc, example)| EncodedExample {
            input_ids:      enc.get_ids().to_vec(),
            attention_mask: enc.get_attention_mask().to_vec(),
            label:          example.label.index(),
        })
        .collect();

    tracing::debug!(
        "Encoded {} examples to length {}",
        encoded.len(),
        encoded.first().map(|e| e.input_ids.len()).unwrap_or(0)
    );

    Ok(encoded)
}

/// Look up the tokenizer's own pad token.
fn pad_token(tokenizer: &Tokenizer) -> (u32, String) {
    PAD_CANDIDATES
        .iter()
        .find_map(|tok| tokenizer.token_to_id(tok).map(|id| (id, tok.to_string())))
        .unwrap_or_else(|| {
            tracing::warn!("Tokenizer has no pad token, padding with id 0");
            (0, "<pad>".to_string())
        })
}
