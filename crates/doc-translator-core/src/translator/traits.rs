use async_trait::async_trait;

use crate::config::Lang;
use crate::error::Result;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Whether this translator requires an API key
    pub requires_api_key: bool,
}

/// A text-in/text-out translation provider.
///
/// Implementations may fail; absorbing those failures is the job of the
/// rate-limited adapter in the crate root, which is the sole caller during
/// a batch run.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate text from source language to target language
    async fn translate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String>;
}
