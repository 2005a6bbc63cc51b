//! Ask command implementation.

use super::persona_prompt;
use crate::cli::AskArgs;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;
use futures::StreamExt;
use neuroverse_domain::Message;
use neuroverse_llm::{CompletionRequest, ProviderRouter};
use std::io::Write;

/// Execute the ask command.
///
/// Table and quiet output stream the answer as it arrives; JSON output
/// waits for the whole reply.
pub async fn execute_ask(
    args: AskArgs,
    router: &ProviderRouter,
    formatter: &Formatter,
) -> Result<String> {
    let system = persona_prompt(&args.persona)?;
    let request = CompletionRequest::new(vec![Message::user(args.message)], system);

    if formatter.format() == OutputFormat::Json {
        let reply = router.complete(&request).await?;
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "reply": reply }))?);
        return Ok(reply);
    }

    let mut stdout = std::io::stdout();
    let reply = stream_reply(router, &request, &mut stdout).await;
    writeln!(stdout)?;
    reply
}

/// Write fragments to `out` as they arrive and return the assembled reply.
///
/// A failure after the first fragment keeps what was written and is
/// returned as the error.
pub async fn stream_reply<W: Write>(
    router: &ProviderRouter,
    request: &CompletionRequest,
    out: &mut W,
) -> Result<String> {
    let mut fragments = router.stream_completion(request).await?;
    let mut reply = String::new();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        write!(out, "{}", fragment)?;
        out.flush()?;
        reply.push_str(&fragment);
    }

    Ok(reply)
}
