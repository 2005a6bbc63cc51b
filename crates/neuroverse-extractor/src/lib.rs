//! NeuroVerse Extractor
//!
//! Turns a brain dump (free-form text) into tagged, prioritized items.
//!
//! # Architecture
//!
//! ```text
//! Text → BrainDump → CompletionSource → raw output → extract_items → Vec<DumpItem>
//! ```
//!
//! The model is asked for a JSON array but is not trusted to produce one.
//! [`extract_items`] recovers every usable item and drops the rest, so a
//! bad reply degrades to fewer items rather than an error.
//!
//! # Example Usage
//!
//! ```no_run
//! use neuroverse_extractor::{BrainDump, ExtractorConfig};
//! use neuroverse_llm::MockProvider;
//!
//! # async fn example() -> Result<(), neuroverse_extractor::ExtractorError> {
//! let llm = MockProvider::new(r#"[{"text":"call the bank","tag":"urgent","priority":"high"}]"#);
//! let pipeline = BrainDump::new(llm, ExtractorConfig::default());
//!
//! let items = pipeline.run("need to call the bank asap").await?;
//! assert_eq!(items[0].text, "call the bank");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod dump;
mod error;
mod parser;
mod prompt;


pub use config::ExtractorConfig;
pub use dump::BrainDump;
pub use error::ExtractorError;
pub use parser::{extract_items, serialize_items};
pub use prompt::DUMP_SYSTEM;
