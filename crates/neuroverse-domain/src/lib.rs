//! NeuroVerse Domain Layer
//!
//! Core value types shared by every other crate in the workspace. This crate
//! performs no I/O; it only depends on `serde` so that its types can cross the
//! HTTP and provider wire boundaries unchanged.
//!
//! ## Key Concepts
//!
//! - **Message**: one conversation turn (`system`, `user` or `assistant`)
//! - **Dump Item**: one tagged, prioritized unit of text recovered from a brain dump
//! - **Row Store**: the persistence collaborator (tasks, notes, memory, messages)
//!
//! ## Architecture
//!
//! - Pure value types and trait definitions only
//! - Infrastructure implementations live in other crates
//!   (`neuroverse-store` implements [`traits::RowStore`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dump;
pub mod message;
pub mod row;
pub mod traits;

// Re-exports for convenience
pub use dump::{DumpItem, Priority, Tag};
pub use message::{Message, Role};
pub use row::{Collection, FieldValue, Row, RowQuery};
