//! OpenAI-compatible streaming wire adapter
//!
//! Sends one `stream: true` chat-completions request and turns the
//! server-sent event body into a [`FragmentStream`] of text deltas.
//!
//! Frame handling:
//! - `data: [DONE]` ends the stream
//! - frames that are not JSON (keep-alives, partial frames) are dropped
//! - frames without `choices[0].delta.content` are dropped
//! - frames carrying an `error` object end the stream with [`LlmError::Stream`]

use crate::provider::{ProviderDescriptor, WireFormat};
use crate::{CompletionRequest, FragmentStream, LlmError};
use eventsource_stream::Eventsource;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    max_tokens: u32,
    stream: bool,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// One streamed chunk
#[derive(Deserialize)]
struct ChunkEnvelope {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// What a single `data:` payload means
#[derive(Debug, PartialEq)]
pub(crate) enum Frame {
    /// Incremental text
    Text(String),
    /// End of stream marker
    Done,
    /// Nothing usable
    Skip,
    /// Provider reported an error in-band
    Error(String),
}

/// Decode the payload of one `data:` line
pub(crate) fn decode_frame(format: WireFormat, data: &str) -> Frame {
    let data = data.trim();
    if data == "[DONE]" {
        return Frame::Done;
    }

    match format {
        WireFormat::OpenAiCompatible => {
            let Ok(chunk) = serde_json::from_str::<ChunkEnvelope>(data) else {
                return Frame::Skip;
            };

            if let Some(error) = chunk.error {
                let message = error.message.unwrap_or_else(|| "unknown error".to_string());
                return match error.code {
                    Some(code) => Frame::Error(format!("{} (code {})", message, code)),
                    None => Frame::Error(message),
                };
            }

            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta)
                .and_then(|delta| delta.content)
                .filter(|text| !text.is_empty())
                .map(Frame::Text)
                .unwrap_or(Frame::Skip)
        }
    }
}

fn request_body<'a>(provider: &'a ProviderDescriptor, request: &'a CompletionRequest) -> ChatRequestBody<'a> {
    // The system instruction always leads; caller history follows untouched
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(WireMessage {
        role: "system",
        content: &request.system_instruction,
    });
    messages.extend(request.messages.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));

    ChatRequestBody {
        model: &provider.model,
        max_tokens: provider.max_tokens,
        stream: true,
        messages,
    }
}

/// Issue the streaming request and return the lazy fragment sequence
///
/// Fails before yielding anything when the provider has no credential, the
/// request cannot be sent, or the response status is not 2xx.
pub async fn open_stream(
    client: &reqwest::Client,
    provider: &ProviderDescriptor,
    request: &CompletionRequest,
) -> Result<FragmentStream, LlmError> {
    let api_key = provider.api_key().ok_or_else(|| {
        LlmError::Config(format!("provider '{}' has no API key", provider.name))
    })?;

    let mut builder = client
        .post(&provider.endpoint)
        .bearer_auth(api_key)
        .json(&request_body(provider, request));
    for (name, value) in provider.kind.extra_headers() {
        builder = builder.header(*name, *value);
    }

    let response = builder.send().await.map_err(|e| LlmError::Transport {
        provider: provider.name.clone(),
        message: e.without_url().to_string(),
    })?;

    let status = response.status();
    debug!("{} responded with {}", provider.name, status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::UpstreamRejected {
            provider: provider.name.clone(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(fragment_stream(provider.name.clone(), provider.wire_format, response))
}

/// Turn a successful streaming response into text fragments
///
/// The response body lives inside the returned stream: dropping the stream
/// closes the connection. After `[DONE]` or an error the body is released
/// immediately.
fn fragment_stream(provider: String, format: WireFormat, response: reqwest::Response) -> FragmentStream {
    let events = Box::pin(response.bytes_stream().eventsource());

    let fragments = stream::unfold(Some(events), move |state| {
        let provider = provider.clone();
        async move {
            let mut events = match state {
                Some(events) => events,
                None => return None,
            };
            loop {
                match events.next().await {
                    None => return None,
                    Some(Ok(event)) => match decode_frame(format, &event.data) {
                        Frame::Text(text) => return Some((Ok(text), Some(events))),
                        Frame::Skip => continue,
                        Frame::Done => return None,
                        Frame::Error(message) => {
                            return Some((Err(LlmError::Stream { provider, message }), None));
                        }
                    },
                    Some(Err(e)) => {
                        let message = e.to_string();
                        return Some((Err(LlmError::Transport { provider, message }), None));
                    }
                }
            }
        }
    });

    Box::pin(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;
    use neuroverse_domain::Message;

    #[test]
    fn test_decode_text_delta() {
        let frame = decode_frame(
            WireFormat::OpenAiCompatible,
            r#"{"choices":[{"delta":{"content":"Hello"}}]}"#,
        );
        assert_eq!(frame, Frame::Text("Hello".to_string()));
    }

    #[test]
    fn test_decode_done() {
        assert_eq!(decode_frame(WireFormat::OpenAiCompatible, " [DONE] "), Frame::Done);
    }

    #[test]
    fn test_decode_skips_garbage_and_empty_deltas() {
        let format = WireFormat::OpenAiCompatible;
        assert_eq!(decode_frame(format, "{\"choices\":[{\"delta\":{\"con"), Frame::Skip);
        assert_eq!(decode_frame(format, "keep-alive"), Frame::Skip);
        assert_eq!(decode_frame(format, r#"{"choices":[{"delta":{}}]}"#), Frame::Skip);
        assert_eq!(decode_frame(format, r#"{"choices":[{"delta":{"content":""}}]}"#), Frame::Skip);
        assert_eq!(decode_frame(format, r#"{"choices":[]}"#), Frame::Skip);
    }

    #[test]
    fn test_decode_error_frame() {
        let frame = decode_frame(
            WireFormat::OpenAiCompatible,
            r#"{"error":{"message":"Rate limit exceeded","code":429}}"#,
        );
        assert_eq!(frame, Frame::Error("Rate limit exceeded (code 429)".to_string()));
    }

    #[test]
    fn test_request_body_prepends_system() {
        let provider = ProviderDescriptor::new(ProviderKind::Groq, Some("k".into()));
        let request = CompletionRequest::new(
            vec![Message::user("hi"), Message::assistant("hello"), Message::user("bye")],
            "be brief",
        );

        let body = serde_json::to_value(request_body(&provider, &request)).unwrap();
        assert_eq!(body["stream"], true);
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["max_tokens"], 2048);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be brief");
        assert_eq!(messages[3]["content"], "bye");
    }
}
