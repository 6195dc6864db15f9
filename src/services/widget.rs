// src/services/widget.rs
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::{
    error::{ChatError, ChatResult},
    message::{Message, StreamRequest},
    services::{
        stream_decoder::StreamDecoder,
        transport::{BodyStream, Transport},
    },
    state::{ChatState, Effect, Event, reduce},
};

/// Whatever displays the message list. Told to follow the newest content
/// once per update of the sequence.
pub trait Viewport {
    fn scroll_to_bottom(&mut self, messages: &[Message]);
}

/// How a response stream came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    Sentinel,
    Exhausted,
}

#[derive(Debug)]
pub enum Submission {
    /// Empty input, or a request already in flight.
    Ignored,
    Completed(StreamEnd),
    Failed(ChatError),
}

pub struct ChatWidget<T, V> {
    state: ChatState,
    transport: T,
    viewport: V,
    idle_timeout: Option<Duration>,
}

impl<T: Transport, V: Viewport> ChatWidget<T, V> {
    pub fn new(transport: T, viewport: V) -> Self {
        Self::with_state(ChatState::new(), transport, viewport)
    }

    pub fn with_state(state: ChatState, transport: T, viewport: V) -> Self {
        let mut widget = Self { state, transport, viewport, idle_timeout: None };
        widget.viewport.scroll_to_bottom(widget.state.messages());
        widget
    }

    /// Longest wait for response headers, and then for each body chunk,
    /// before the exchange fails.
    pub fn set_idle_timeout(&mut self, timeout: Option<Duration>) {
        self.idle_timeout = timeout;
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.state.set_input(input);
    }

    /// Submit the current input and stream the answer into the last message.
    pub async fn submit(&mut self) -> Submission {
        let request = match self.dispatch(Event::Submit) {
            Effect::Send(request) => request,
            _ => return Submission::Ignored,
        };
        info!(query_len = request.query.len(), history = request.history.len(), "submitting query");

        match self.exchange(&request).await {
            Ok(end) => {
                info!(?end, "response complete");
                Submission::Completed(end)
            }
            Err(err) => {
                error!(error = %err, "streaming error");
                self.dispatch(Event::Failed);
                Submission::Failed(err)
            }
        }
    }

    /// Abandon the in-flight exchange, dropping the placeholder.
    ///
    /// Meant for a caller that dropped a pending [`ChatWidget::submit`].
    pub fn cancel(&mut self) -> bool {
        if !self.state.is_awaiting() {
            return false;
        }
        warn!("response cancelled");
        self.dispatch(Event::Cancelled);
        true
    }

    async fn exchange(&mut self, request: &StreamRequest) -> ChatResult<StreamEnd> {
        let opening = self.transport.open(request);
        let mut body = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, opening).await.map_err(|_| {
                ChatError::Connection(format!("no response headers within {limit:?}"))
            })??,
            None => opening.await?,
        };
        self.dispatch(Event::Connected);

        let mut decoder = StreamDecoder::new();
        while let Some(chunk) = self.next_chunk(&mut body).await? {
            debug!(bytes = chunk.len(), "chunk received");
            let frames = decoder.feed(&chunk);
            if frames.is_empty() {
                continue;
            }
            if self.dispatch(Event::Frames(frames)) == Effect::Stop {
                return Ok(StreamEnd::Sentinel);
            }
        }

        let frames = decoder.finish();
        if !frames.is_empty() && self.dispatch(Event::Frames(frames)) == Effect::Stop {
            return Ok(StreamEnd::Sentinel);
        }
        self.dispatch(Event::StreamEnded);
        Ok(StreamEnd::Exhausted)
    }

    async fn next_chunk(&self, body: &mut BodyStream) -> ChatResult<Option<Vec<u8>>> {
        let next = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, body.next())
                .await
                .map_err(|_| ChatError::Stream(format!("no data received for {limit:?}")))?,
            None => body.next().await,
        };
        next.transpose()
    }

    fn dispatch(&mut self, event: Event) -> Effect {
        let transition = reduce(&mut self.state, event);
        if transition.messages_changed {
            self.viewport.scroll_to_bottom(self.state.messages());
        }
        transition.effect
    }
}
