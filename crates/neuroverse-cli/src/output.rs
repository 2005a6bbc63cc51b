//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use neuroverse_domain::{DumpItem, Priority, Tag};
use neuroverse_extractor::serialize_items;
use neuroverse_llm::ProviderDescriptor;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format brain-dump items.
    pub fn format_items(&self, items: &[DumpItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serialize_items(items).map_err(Into::into),
            OutputFormat::Table => Ok(self.format_items_table(items)),
            OutputFormat::Quiet => Ok(items
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_items_table(&self, items: &[DumpItem]) -> String {
        if items.is_empty() {
            return self.warning("Nothing recognised. Try again or rephrase.");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Item", "Tag", "Priority"]);

        for (i, item) in items.iter().enumerate() {
            builder.push_record([
                (i + 1).to_string(),
                item.text.clone(),
                self.tag_label(item.tag),
                self.priority_label(item.priority),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the provider chain with availability.
    pub fn format_providers(&self, providers: &[ProviderDescriptor]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = providers
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.name,
                            "model": p.model,
                            "endpoint": p.endpoint,
                            "available": p.is_available(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(providers
                .iter()
                .filter(|p| p.is_available())
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if providers.is_empty() {
                    return Ok(self.warning("No providers configured."));
                }

                let mut builder = Builder::default();
                builder.push_record(["Priority", "Provider", "Model", "Key"]);
                for (i, p) in providers.iter().enumerate() {
                    let key = if p.is_available() {
                        self.colorize("set", "green")
                    } else {
                        self.colorize(&format!("missing ({})", p.kind.api_key_env()), "red")
                    };
                    builder.push_record([(i + 1).to_string(), p.name.clone(), p.model.clone(), key]);
                }

                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn tag_label(&self, tag: Tag) -> String {
        let color = match tag {
            Tag::Income => "green",
            Tag::Cost => "red",
            Tag::Idea => "magenta",
            Tag::Urgent => "yellow",
            Tag::Neutral => "",
        };
        self.colorize(tag.as_str(), color)
    }

    fn priority_label(&self, priority: Priority) -> String {
        match priority {
            Priority::High => self.colorize("high", "red"),
            Priority::Medium => self.colorize("medium", "cyan"),
            Priority::Low => priority.as_str().to_string(),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}
