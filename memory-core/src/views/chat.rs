//! Chat view: a transcript of questions answered from memory.
//!
//! The view allows one query in flight at a time. A submission appends the
//! user's message immediately and waits for the backend; the answer (or the
//! failure) is appended when the matching completion arrives.

use memory_api::{Error, Fact, QueryResponse};
use thiserror::Error;

use crate::input::InputBuffer;
use crate::task::Ticket;

/// Prompts offered on an empty transcript.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "What are my current projects?",
    "What are my preferences?",
    "Summarize my goals",
    "What do you know about me?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Lives only as long as the chat view.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Facts the answer was grounded on, in retrieval order.
    pub facts: Vec<Fact>,
    /// Set on the assistant entry standing in for a failed query.
    pub error: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            facts: Vec::new(),
            error: None,
        }
    }

    pub fn assistant(content: impl Into<String>, facts: Vec<Fact>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            facts,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            facts: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse(Ticket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("a query is already in flight")]
    Busy,

    #[error("type a question first")]
    Empty,
}

#[derive(Debug)]
pub struct ChatView {
    input: InputBuffer,
    transcript: Vec<Message>,
    state: ChatState,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            input: InputBuffer::new(),
            transcript: Vec::new(),
            state: ChatState::Idle,
        }
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Mutable access to the input box. Edits are ignored while awaiting.
    pub fn input_mut(&mut self) -> Option<&mut InputBuffer> {
        match self.state {
            ChatState::Idle => Some(&mut self.input),
            ChatState::AwaitingResponse(_) => None,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, ChatState::AwaitingResponse(_))
    }

    /// Whether the send control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_awaiting() && !self.input.is_blank()
    }

    /// Copy a suggested prompt into the input box.
    pub fn use_suggestion(&mut self, index: usize) -> bool {
        match (self.input_mut(), SUGGESTED_PROMPTS.get(index)) {
            (Some(input), Some(prompt)) => {
                input.set(*prompt);
                true
            }
            _ => false,
        }
    }

    /// Submit the current input.
    ///
    /// On success the user message is already in the transcript, the input is
    /// cleared, and `dispatch` has been handed the trimmed query text.
    pub fn submit(
        &mut self,
        dispatch: impl FnOnce(String) -> Ticket,
    ) -> Result<Ticket, SubmitRejected> {
        if self.is_awaiting() {
            return Err(SubmitRejected::Busy);
        }
        if self.input.is_blank() {
            return Err(SubmitRejected::Empty);
        }

        let text = self
            .input
            .submit()
            .map(|raw| raw.trim().to_string())
            .unwrap_or_default();
        self.transcript.push(Message::user(text.clone()));

        let ticket = dispatch(text);
        self.state = ChatState::AwaitingResponse(ticket);
        Ok(ticket)
    }

    /// Apply the outcome of a query. Returns false for a completion this view
    /// is not waiting on.
    pub fn apply_response(&mut self, ticket: Ticket, result: Result<QueryResponse, Error>) -> bool {
        if self.state != ChatState::AwaitingResponse(ticket) {
            tracing::debug!(?ticket, "ignoring query response the chat is not waiting for");
            return false;
        }
        self.state = ChatState::Idle;

        match result {
            Ok(response) => {
                self.transcript
                    .push(Message::assistant(response.answer, response.retrieved_facts));
            }
            Err(e) => {
                tracing::warn!(error = %e, "query failed");
                self.transcript.push(Message::failed(e.to_string()));
            }
        }
        true
    }
}
