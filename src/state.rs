// src/state.rs
//! Conversation state and the reducer that folds widget events into it.

use crate::error::GENERIC_FAILURE;
use crate::message::{Message, StreamRequest};
use crate::services::stream_decoder::Frame;

pub const WELCOME_MESSAGE: &str =
    "Hello! I'm Me-Lo AI, your medical assistant. Ask me anything about health and medicine.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Request sent, no response headers yet.
    Sending,
    Streaming,
}

#[derive(Debug)]
pub enum Event {
    Submit,
    Connected,
    /// Everything decoded from a single read.
    Frames(Vec<Frame>),
    StreamEnded,
    Failed,
    Cancelled,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Send(StreamRequest),
    /// `[DONE]` seen; stop reading.
    Stop,
}

#[derive(Debug, PartialEq)]
pub struct Transition {
    pub effect: Effect,
    pub messages_changed: bool,
}

impl Transition {
    fn unchanged() -> Self {
        Self { effect: Effect::None, messages_changed: false }
    }

    fn changed(effect: Effect) -> Self {
        Self { effect, messages_changed: true }
    }
}

#[derive(Clone, Debug)]
pub struct ChatState {
    messages: Vec<Message>,
    input: String,
    phase: Phase,
    error: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatState {
    /// A fresh conversation seeded with the welcome message.
    pub fn new() -> Self {
        Self::with_messages(vec![Message::bot(WELCOME_MESSAGE)])
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages, input: String::new(), phase: Phase::Idle, error: None }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn rollback_placeholder(&mut self) -> bool {
        if self.messages.last().is_some_and(Message::is_bot) {
            self.messages.pop();
            true
        } else {
            false
        }
    }
}

pub fn reduce(state: &mut ChatState, event: Event) -> Transition {
    match event {
        Event::Submit => {
            if state.is_awaiting() || state.input.trim().is_empty() {
                return Transition::unchanged();
            }
            let history = state.messages.clone();
            let query = std::mem::take(&mut state.input);
            state.messages.push(Message::user(query.clone()));
            state.messages.push(Message::bot(""));
            state.phase = Phase::Sending;
            state.error = None;
            Transition::changed(Effect::Send(StreamRequest { query, history }))
        }

        Event::Connected => {
            if state.phase == Phase::Sending {
                state.phase = Phase::Streaming;
            }
            Transition::unchanged()
        }

        Event::Frames(frames) => {
            if state.phase != Phase::Streaming {
                return Transition::unchanged();
            }
            let mut changed = false;
            for frame in frames {
                match frame {
                    Frame::Done => {
                        state.phase = Phase::Idle;
                        return Transition { effect: Effect::Stop, messages_changed: changed };
                    }
                    Frame::Text(text) => {
                        if let Some(last) = state.messages.last_mut().filter(|m| m.is_bot()) {
                            last.text.push_str(&text);
                            changed = true;
                        }
                    }
                }
            }
            Transition { effect: Effect::None, messages_changed: changed }
        }

        Event::StreamEnded => {
            state.phase = Phase::Idle;
            Transition::unchanged()
        }

        Event::Failed => {
            if !state.is_awaiting() {
                return Transition::unchanged();
            }
            state.phase = Phase::Idle;
            state.error = Some(GENERIC_FAILURE.to_string());
            Transition { effect: Effect::None, messages_changed: state.rollback_placeholder() }
        }

        Event::Cancelled => {
            if !state.is_awaiting() {
                return Transition::unchanged();
            }
            state.phase = Phase::Idle;
            Transition { effect: Effect::None, messages_changed: state.rollback_placeholder() }
        }
    }
}
