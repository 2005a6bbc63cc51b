//! Dump module - items recovered from a brain dump
//!
//! A brain dump is free-form text that the user types in one go. The
//! extractor breaks it into [`DumpItem`]s, each carrying a [`Tag`] and a
//! [`Priority`]. Unknown tags and priorities are never errors; they fall
//! back to [`Tag::Neutral`] and [`Priority::Medium`].

use serde::{Deserialize, Serialize};

/// Category of a dump item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Will make money or generate revenue
    Income,

    /// Will cost money or is an expense
    Cost,

    /// A future idea or plan, not urgent
    Idea,

    /// Time-sensitive, needs doing very soon
    Urgent,

    /// Everything else
    #[default]
    Neutral,
}

impl Tag {
    /// All tags in declaration order
    pub const ALL: [Tag; 5] = [Tag::Income, Tag::Cost, Tag::Idea, Tag::Urgent, Tag::Neutral];

    /// Get the tag name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Income => "income",
            Tag::Cost => "cost",
            Tag::Idea => "idea",
            Tag::Urgent => "urgent",
            Tag::Neutral => "neutral",
        }
    }

    /// Parse a tag from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Tag::Income),
            "cost" => Some(Tag::Cost),
            "idea" => Some(Tag::Idea),
            "urgent" => Some(Tag::Urgent),
            "neutral" => Some(Tag::Neutral),
            _ => None,
        }
    }
}

impl std::str::FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid tag: {}", s))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a dump item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Do this today or this week
    High,

    /// Do this soon
    #[default]
    Medium,

    /// Nice to have, can wait
    Low,
}

impl Priority {
    /// All priorities, most urgent first
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Get the priority name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse a priority from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid priority: {}", s))
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tagged, prioritized unit of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpItem {
    /// Item description (never empty)
    pub text: String,

    /// Category
    pub tag: Tag,

    /// Urgency
    pub priority: Priority,
}

impl DumpItem {
    /// Create an item, trimming the text
    ///
    /// Returns `None` when the trimmed text is empty.
    pub fn new(text: impl AsRef<str>, tag: Tag, priority: Priority) -> Option<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            tag,
            priority,
        })
    }
}
