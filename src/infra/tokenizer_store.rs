// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Resolves the tokenizer for a run and keeps a copy next to the
// checkpoints.
//
// The source is either:
//   - a path to a HuggingFace `tokenizer.json`, or
//   - a pretrained identifier such as `google-t5/t5-base`,
//     downloaded from the HuggingFace hub.
//
// Whatever was resolved is saved as `<output_dir>/tokenizer.json`
// so that `evaluate` encodes text with exactly the vocabulary the
// model was trained on, without touching the network.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

const TOKENIZER_FILE: &str = "tokenizer.json";

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve `source` and save a copy into the store.
    pub fn load_source(&self, source: &str) -> Result<Tokenizer> {
        let path = Path::new(source);

        let tokenizer = if path.is_file() {
            tracing::info!("Loading tokenizer from file '{}'", source);
            Tokenizer::from_file(path)
                .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {}", source, e))?
        } else {
            tracing::info!("Fetching pretrained tokenizer '{}'", source);
            Tokenizer::from_pretrained(source, None)
                .map_err(|e| anyhow!("Cannot fetch pretrained tokenizer '{}': {}", source, e))?
        };

        self.save(&tokenizer)?;
        Ok(tokenizer)
    }

    /// Load the tokenizer saved by a previous training run.
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    fn save(&self, tokenizer: &Tokenizer) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path();
        tokenizer
            .save(&path, false)
            .map_err(|e| anyhow!("Cannot write tokenizer to '{}': {}", path.display(), e))?;
        tracing::debug!(
            "Tokenizer ({} tokens) saved to '{}'",
            tokenizer.get_vocab_size(true),
            path.display()
        );
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::word_level_tokenizer;
    use super::*;

    #[test]
    fn test_load_from_file_and_reload_copy() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        let src_path = src_dir.path().join("tokenizer.json");
        word_level_tokenizer(&["crash", "save"]).save(&src_path, false).unwrap();

        let store = TokenizerStore::new(out_dir.path());
        let tok   = store.load_source(src_path.to_str().unwrap()).unwrap();
        assert_eq!(tok.token_to_id("crash"), Some(3));

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.token_to_id("save"), Some(4));
        assert_eq!(reloaded.get_vocab_size(true), tok.get_vocab_size(true));
    }

    #[test]
    fn test_load_without_saved_tokenizer_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TokenizerStore::new(dir.path()).load().is_err());
    }
}
