//! Brain-dump pipeline: text → completion → items

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::extract_items;
use crate::prompt::DUMP_SYSTEM;
use neuroverse_domain::{DumpItem, Message};
use neuroverse_llm::{CompletionRequest, CompletionSource};
use tokio::time::timeout;
use tracing::{debug, info};

/// Turns free-form text into tagged items using a completion source
pub struct BrainDump<C> {
    source: C,
    config: ExtractorConfig,
}

impl<C: CompletionSource> BrainDump<C> {
    /// Create a pipeline over `source`
    pub fn new(source: C, config: ExtractorConfig) -> Self {
        Self { source, config }
    }

    /// The completion source
    pub fn source(&self) -> &C {
        &self.source
    }

    /// Break `text` into items
    ///
    /// Blank input yields no items without calling the source. An empty
    /// result otherwise means the model produced nothing usable.
    pub async fn run(&self, text: &str) -> Result<Vec<DumpItem>, ExtractorError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        info!("Processing brain dump of {} chars", length);

        let request = CompletionRequest::new(vec![Message::user(text)], DUMP_SYSTEM);
        let raw = timeout(self.config.timeout(), self.source.complete(&request))
            .await
            .map_err(|_| ExtractorError::Timeout)??;

        debug!("Model returned {} chars", raw.len());

        let items = extract_items(&raw);
        info!("Recovered {} items", items.len());
        Ok(items)
    }
}
