//! Plain-text adapter.
//!
//! The whole file is one translation unit; the cache makes re-running a
//! batch over unchanged files free.

use std::path::Path;

use async_trait::async_trait;

use super::FormatAdapter;
use crate::DocTranslator;
use crate::error::{Error, Result};

pub struct TxtAdapter;

#[async_trait]
impl FormatAdapter for TxtAdapter {
    fn name(&self) -> &'static str {
        "txt"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    async fn translate_file(
        &self,
        translator: &DocTranslator,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let bytes = std::fs::read(input).map_err(|e| Error::DocumentRead {
            path: input.display().to_string(),
            reason: e.to_string(),
        })?;
        let content = decode(&bytes);

        let translated = if content.trim().is_empty() {
            content.into_owned()
        } else {
            translator.translate_text(&content).await.into_text()
        };

        // Output is always UTF-8, whatever the input encoding was
        std::fs::write(output, translated).map_err(|e| Error::DocumentWrite {
            path: output.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

/// Decode as UTF-8, falling back to Windows-1252 for legacy exports.
fn decode(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => std::borrow::Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}
