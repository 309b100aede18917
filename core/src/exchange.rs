//! One user utterance in, one assistant turn out.

use std::fmt;

use tracing::{debug, warn};

use crate::client::GeminiClient;
use crate::errors::{ChatError, ErrorKind};
use crate::turn::{Turn, TurnStore};

/// Reply used when the response parsed but held no usable text.
pub const PLACEHOLDER_REPLY: &str = "Sorry, I could not get a response.";
/// Reply recorded when the response body is not JSON.
pub const DECODE_ERROR_REPLY: &str = "Error: Failed to parse API response.";
/// Banner shown when the response body is not JSON.
pub const DECODE_ERROR_NOTICE: &str = "Failed to parse JSON response from Gemini API.";

/// Lifecycle of a single exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    AwaitingResponse,
    Rendered,
    ErrorRendered,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeState::Idle => "idle",
            ExchangeState::AwaitingResponse => "awaiting_response",
            ExchangeState::Rendered => "rendered",
            ExchangeState::ErrorRendered => "error_rendered",
        };
        f.write_str(name)
    }
}

/// Message for the user-visible error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorNotice {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of one exchange. `reply` is a copy of the assistant turn that was
/// appended to the store.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub reply: Turn,
    pub notice: Option<ErrorNotice>,
    pub state: ExchangeState,
}

impl ExchangeOutcome {
    pub fn reply_text(&self) -> &str {
        self.reply.text().unwrap_or_default()
    }

    pub fn is_error(&self) -> bool {
        self.state == ExchangeState::ErrorRendered
    }
}

/// Turns a user utterance into exactly two appended turns: the utterance
/// itself and an assistant reply (real, placeholder, or error text).
#[derive(Debug, Clone)]
pub struct ExchangeReducer {
    client: GeminiClient,
}

impl ExchangeReducer {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub async fn handle_user_turn(&self, store: &mut TurnStore, utterance: &str) -> ExchangeOutcome {
        let mut state = ExchangeState::Idle;

        // The user's own turn stays visible whatever happens next.
        store.append(Turn::user(utterance));
        transition(&mut state, ExchangeState::AwaitingResponse);

        let request = self.client.build_request(store.all());
        let (text, notice) = match self.client.generate_content(&request).await {
            Ok(response) => match self.client.extract_text(&response) {
                Ok(text) => (text, None),
                Err(issue) => (
                    PLACEHOLDER_REPLY.to_string(),
                    Some(ErrorNotice::new(ErrorKind::Shape, issue.to_string())),
                ),
            },
            Err(err) => failure_reply(err),
        };

        if let Some(notice) = &notice {
            warn!(kind = %notice.kind, "Exchange failed: {}", notice.message);
        }

        let reply = Turn::assistant(text);
        store.append(reply.clone());

        let next = if notice.is_some() {
            ExchangeState::ErrorRendered
        } else {
            ExchangeState::Rendered
        };
        transition(&mut state, next);

        ExchangeOutcome {
            reply,
            notice,
            state,
        }
    }
}

fn transition(state: &mut ExchangeState, next: ExchangeState) {
    debug!(from = %state, to = %next, "Exchange state change");
    *state = next;
}

/// Reply text and banner for an exchange that did not produce a usable response.
fn failure_reply(err: ChatError) -> (String, Option<ErrorNotice>) {
    match err.kind() {
        ErrorKind::Transport => {
            let detail = match &err {
                ChatError::TransportError(msg) => msg.clone(),
                other => other.to_string(),
            };
            (
                format!("Error: Could not connect to the API. {}", detail),
                Some(ErrorNotice::new(
                    ErrorKind::Transport,
                    format!("Error communicating with Gemini API: {}", detail),
                )),
            )
        }
        ErrorKind::Decode => (
            DECODE_ERROR_REPLY.to_string(),
            Some(ErrorNotice::new(ErrorKind::Decode, DECODE_ERROR_NOTICE)),
        ),
        ErrorKind::Shape => {
            let message = match &err {
                ChatError::ShapeError(issue) => issue.to_string(),
                other => other.to_string(),
            };
            (
                PLACEHOLDER_REPLY.to_string(),
                Some(ErrorNotice::new(ErrorKind::Shape, message)),
            )
        }
        ErrorKind::Unexpected => {
            let detail = match &err {
                ChatError::UnexpectedError(msg) => msg.clone(),
                other => other.to_string(),
            };
            let message = format!("An unexpected error occurred: {}", detail);
            (
                message.clone(),
                Some(ErrorNotice::new(ErrorKind::Unexpected, message)),
            )
        }
    }
}
