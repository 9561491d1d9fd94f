//! Event stream emitter.
//!
//! A run publishes on two independent channels:
//!
//! - the **UI channel**: an ordered stream of [`UiEvent`]s for one consumer,
//!   marked done exactly once;
//! - the **terminal channel**: a single-resolution future carrying the
//!   [`RunOutcome`].
//!
//! The only coupling is ordering: [`EventEmitter::finish`] marks the UI
//! channel done before it resolves the terminal channel. The UI channel is
//! unbounded, so a caller can await the result without draining events.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use genui_core::ui::UiFragment;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::error::{AgentError, RunError, RunOutcome, StreamError};

/// What a UI event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEventKind {
    Loading,
    Result,
    Error,
}

impl UiEventKind {
    /// SSE event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Result => "result",
            Self::Error => "error",
        }
    }
}

/// How the client applies a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiOp {
    /// Add a new fragment to the view.
    Append,
    /// Replace the fragment previously appended under the same id.
    Update,
}

/// One item on the UI channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    /// Fragment id; an update targets the append with the same id.
    pub id: String,
    pub kind: UiEventKind,
    pub op: UiOp,
    /// Tool that produced the fragment.
    pub tool: String,
    pub fragment: UiFragment,
}

impl UiEvent {
    /// SSE event name for this event.
    pub fn event_type(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// Producer half of the UI channel.
pub struct UiSender {
    tx: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl UiSender {
    /// Push one event. Never waits on the consumer.
    pub fn push(&self, event: UiEvent) -> Result<(), StreamError> {
        let Some(tx) = &self.tx else {
            return Err(StreamError::Closed);
        };
        tx.send(event).map_err(|_| StreamError::ConsumerGone)
    }

    /// Close the channel. The consumer sees the end of the stream once it
    /// has drained what was already pushed.
    pub fn mark_done(&mut self) {
        self.tx = None;
    }

    pub fn is_done(&self) -> bool {
        self.tx.is_none()
    }
}

/// Consumer half of the UI channel.
pub struct UiStream {
    inner: UnboundedReceiverStream<UiEvent>,
}

impl Stream for UiStream {
    type Item = UiEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<UiEvent>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Producer half of the terminal channel. Consumed on resolve.
pub struct TerminalSender {
    tx: oneshot::Sender<RunOutcome>,
}

impl TerminalSender {
    pub fn resolve(self, outcome: RunOutcome) {
        // A caller that stopped waiting is not an error.
        let _ = self.tx.send(outcome);
    }
}

/// Consumer half of the terminal channel.
///
/// Resolves exactly once. If the run went away without settling, this
/// reads as a cancelled run.
pub struct RunResult {
    rx: oneshot::Receiver<RunOutcome>,
}

impl Future for RunResult {
    type Output = RunOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<RunOutcome> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RunError::from(AgentError::Cancelled))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Both producer halves, owned by the run.
pub struct EventEmitter {
    ui: UiSender,
    terminal: TerminalSender,
}

impl EventEmitter {
    /// Create a fresh pair of channels.
    pub fn channel() -> (Self, UiStream, RunResult) {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();
        (
            Self {
                ui: UiSender { tx: Some(ui_tx) },
                terminal: TerminalSender { tx: result_tx },
            },
            UiStream {
                inner: UnboundedReceiverStream::new(ui_rx),
            },
            RunResult { rx: result_rx },
        )
    }

    pub fn ui(&self) -> &UiSender {
        &self.ui
    }

    /// Settle the run: UI channel done first, then the terminal value.
    pub fn finish(mut self, outcome: RunOutcome) {
        self.ui.mark_done();
        self.terminal.resolve(outcome);
    }
}
