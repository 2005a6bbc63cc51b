//! Streaming chat relay.
//!
//! `POST /api/chat` commits to a provider before answering. A failure up to
//! that point is a plain JSON error; after it, fragments are relayed as SSE
//! `data:` frames, a failure becomes an inline `{"error"}` frame, and every
//! stream ends with `data: [DONE]`.

use crate::handlers::{AppError, AppState};
use crate::prompts::system_prompt;
use axum::{
    extract::State,
    response::{
        sse::{Event, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use neuroverse_domain::{Message, Role};
use neuroverse_llm::{CompletionRequest, FragmentStream};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    pub messages: Vec<Message>,
    /// Listening-only persona
    #[serde(default)]
    pub confidant: bool,
}

/// POST /api/chat - Relay one completion as server-sent events
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let deadline = Instant::now() + state.config.request_timeout();

    let last = request
        .messages
        .last()
        .ok_or_else(|| AppError::BadRequest("messages are required".to_string()))?;

    if last.role == Role::User && !last.content.trim().is_empty() {
        state.record_message(Role::User, &last.content)?;
    }

    let memory = state.memory()?;
    let system = system_prompt(request.confidant, memory.as_deref());
    let history = recent(request.messages, state.config.history_limit);
    info!(
        "Chat turn: {} messages forwarded, confidant={}",
        history.len(),
        request.confidant
    );

    let completion = CompletionRequest::new(history, system);
    let fragments = timeout_at(deadline, state.router.stream_completion(&completion))
        .await
        .map_err(|_| AppError::Timeout)??;

    let relay = ChatRelay {
        phase: Phase::Streaming(fragments),
        reply: String::new(),
        state,
        deadline,
    };
    Ok(Sse::new(stream::unfold(relay, ChatRelay::step)))
}

/// The last `limit` turns
fn recent(mut messages: Vec<Message>, limit: usize) -> Vec<Message> {
    let start = messages.len().saturating_sub(limit);
    messages.split_off(start)
}

enum Phase {
    Streaming(FragmentStream),
    Closing,
    Done,
}

struct ChatRelay {
    phase: Phase,
    reply: String,
    state: AppState,
    deadline: Instant,
}

impl ChatRelay {
    async fn step(mut self) -> Option<(Result<Event, Infallible>, Self)> {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Streaming(mut fragments) => {
                match timeout_at(self.deadline, fragments.next()).await {
                    Ok(Some(Ok(text))) => {
                        self.reply.push_str(&text);
                        self.phase = Phase::Streaming(fragments);
                        Some((Ok(text_event(&text)), self))
                    }
                    Ok(Some(Err(e))) => {
                        warn!("Chat stream failed after commit: {}", e);
                        self.phase = Phase::Closing;
                        Some((Ok(error_event(&e.to_string())), self))
                    }
                    Err(_) => {
                        // dropping `fragments` here releases the upstream connection
                        warn!("Chat stream cut off at the request ceiling");
                        self.phase = Phase::Closing;
                        Some((Ok(error_event(&AppError::Timeout.to_string())), self))
                    }
                    Ok(None) => {
                        self.finish();
                        Some((Ok(done_event()), self))
                    }
                }
            }
            Phase::Closing => {
                self.finish();
                Some((Ok(done_event()), self))
            }
            Phase::Done => None,
        }
    }

    /// Persist whatever reply was assembled
    fn finish(&self) {
        if self.reply.trim().is_empty() {
            return;
        }
        if let Err(e) = self.state.record_message(Role::Assistant, &self.reply) {
            error!("Failed to save assistant reply: {}", e);
        }
    }
}

fn text_event(text: &str) -> Event {
    Event::default().data(serde_json::json!({ "text": text }).to_string())
}

fn error_event(message: &str) -> Event {
    Event::default().data(serde_json::json!({ "error": message }).to_string())
}

fn done_event() -> Event {
    Event::default().data("[DONE]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_keeps_newest_turns() {
        let messages: Vec<Message> = (0..25).map(|i| Message::user(i.to_string())).collect();
        let kept = recent(messages, 20);
        assert_eq!(kept.len(), 20);
        assert_eq!(kept[0].content, "5");
        assert_eq!(kept[19].content, "24");
    }

    #[test]
    fn test_recent_short_history_untouched() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        assert_eq!(recent(messages.clone(), 20), messages);
    }
}
