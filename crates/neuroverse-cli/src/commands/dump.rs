//! Dump command implementation.

use crate::cli::DumpArgs;
use crate::error::Result;
use crate::output::Formatter;
use neuroverse_domain::DumpItem;
use neuroverse_extractor::{BrainDump, ExtractorConfig};
use neuroverse_llm::CompletionSource;
use std::fs;
use std::io::Read;

/// Execute the dump command.
pub async fn execute_dump<C: CompletionSource>(
    args: DumpArgs,
    source: C,
    config: ExtractorConfig,
    formatter: &Formatter,
) -> Result<Vec<DumpItem>> {
    let text = read_text(args)?;

    let pipeline = BrainDump::new(source, config);
    let items = pipeline.run(&text).await?;

    println!("{}", formatter.format_items(&items)?);
    Ok(items)
}

/// Text from the argument, the input file, or stdin.
fn read_text(args: DumpArgs) -> Result<String> {
    if let Some(text) = args.text {
        return Ok(text);
    }
    if let Some(path) = args.input {
        return Ok(fs::read_to_string(path)?);
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use neuroverse_domain::Tag;
    use neuroverse_llm::MockProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_dump_with_inline_text() {
        let llm = MockProvider::new(
            r#"[{"text":"Pay supplier","tag":"cost","priority":"high"}]"#,
        );
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = DumpArgs {
            text: Some("pay the supplier today".to_string()),
            input: None,
        };

        let items = execute_dump(args, llm.clone(), ExtractorConfig::default(), &formatter)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tag, Tag::Cost);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dump_reads_input_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "idea: scented candles").unwrap();

        let llm = MockProvider::new(r#"[{"text":"Scented candles","tag":"idea"}]"#);
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = DumpArgs {
            text: None,
            input: Some(file.path().to_path_buf()),
        };

        execute_dump(args, llm.clone(), ExtractorConfig::default(), &formatter)
            .await
            .unwrap();

        let request = llm.last_request().unwrap();
        assert_eq!(request.messages[0].content, "idea: scented candles");
    }
}
