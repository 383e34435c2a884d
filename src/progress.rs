//! Progress reporting capability for batch generation.
//!
//! The generator never talks to a terminal or a widget directly; it calls a
//! [`ProgressSink`]. Hosts pick one of the sinks below or bring their own.

use crate::error::Error;
use crate::generator::CancelHandle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

/// Receiver of generation progress. Called from the generator's thread.
pub trait ProgressSink: Send + Sync {
    /// Free-form status line ("Generating QR code for table 3/15")
    fn on_status(&self, message: &str);

    /// `current` tables out of `total` have been written
    fn on_progress(&self, current: u32, total: u32);

    /// The configured font could not be loaded; the bitmap fallback is in use
    fn on_font_fallback(&self);

    /// Every table was written to `directory`
    fn on_complete(&self, count: u32, directory: &Path);

    /// The run stopped early after `completed` tables
    fn on_cancelled(&self, completed: u32);

    /// The run aborted
    fn on_fatal_error(&self, cause: &Error);
}

/// Owned, serializable form of a sink callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// See [`ProgressSink::on_status`]
    Status {
        /// Status text
        message: String,
    },
    /// See [`ProgressSink::on_progress`]
    Progress {
        /// Tables written so far
        current: u32,
        /// Tables requested
        total: u32,
    },
    /// See [`ProgressSink::on_font_fallback`]
    FontFallback,
    /// See [`ProgressSink::on_complete`]
    Complete {
        /// Tables written
        count: u32,
        /// Output directory
        directory: PathBuf,
    },
    /// See [`ProgressSink::on_cancelled`]
    Cancelled {
        /// Tables written before the stop
        completed: u32,
    },
    /// See [`ProgressSink::on_fatal_error`]
    FatalError {
        /// Rendered error
        cause: String,
    },
}

/// Logs every callback through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_status(&self, message: &str) {
        tracing::debug!(target: "tableqr::progress", "{message}");
    }

    fn on_progress(&self, current: u32, total: u32) {
        tracing::info!(target: "tableqr::progress", current, total, "table written");
    }

    fn on_font_fallback(&self) {
        tracing::warn!(target: "tableqr::progress", "using built-in font (configured font unavailable)");
    }

    fn on_complete(&self, count: u32, directory: &Path) {
        tracing::info!(
            target: "tableqr::progress",
            count,
            directory = %directory.display(),
            "generation complete"
        );
    }

    fn on_cancelled(&self, completed: u32) {
        tracing::warn!(target: "tableqr::progress", completed, "generation cancelled");
    }

    fn on_fatal_error(&self, cause: &Error) {
        tracing::error!(target: "tableqr::progress", error = %cause, "generation failed");
    }
}

/// Forwards events to an async task over an unbounded channel.
///
/// Sending never blocks, so the sink is safe to call from a blocking thread.
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("progress receiver dropped");
        }
    }
}

impl ProgressSink for ChannelSink {
    fn on_status(&self, message: &str) {
        self.send(ProgressEvent::Status {
            message: message.to_string(),
        });
    }

    fn on_progress(&self, current: u32, total: u32) {
        self.send(ProgressEvent::Progress { current, total });
    }

    fn on_font_fallback(&self) {
        self.send(ProgressEvent::FontFallback);
    }

    fn on_complete(&self, count: u32, directory: &Path) {
        self.send(ProgressEvent::Complete {
            count,
            directory: directory.to_path_buf(),
        });
    }

    fn on_cancelled(&self, completed: u32) {
        self.send(ProgressEvent::Cancelled { completed });
    }

    fn on_fatal_error(&self, cause: &Error) {
        self.send(ProgressEvent::FatalError {
            cause: cause.to_string(),
        });
    }
}

/// Collects events in memory, optionally cancelling once a given progress
/// value is reported.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
    cancel_at: Option<(u32, CancelHandle)>,
}

impl RecordingSink {
    /// Sink that only records
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that requests cancellation right after table `completed` is reported
    pub fn cancel_after(completed: u32, handle: CancelHandle) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_at: Some((completed, handle)),
        }
    }

    /// Copy of every event seen so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of font fallback notifications seen
    pub fn fallback_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::FontFallback))
            .count()
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressSink for RecordingSink {
    fn on_status(&self, message: &str) {
        self.push(ProgressEvent::Status {
            message: message.to_string(),
        });
    }

    fn on_progress(&self, current: u32, total: u32) {
        self.push(ProgressEvent::Progress { current, total });
        if let Some((at, handle)) = &self.cancel_at {
            if current >= *at {
                handle.cancel();
            }
        }
    }

    fn on_font_fallback(&self) {
        self.push(ProgressEvent::FontFallback);
    }

    fn on_complete(&self, count: u32, directory: &Path) {
        self.push(ProgressEvent::Complete {
            count,
            directory: directory.to_path_buf(),
        });
    }

    fn on_cancelled(&self, completed: u32) {
        self.push(ProgressEvent::Cancelled { completed });
    }

    fn on_fatal_error(&self, cause: &Error) {
        self.push(ProgressEvent::FatalError {
            cause: cause.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(ProgressEvent::Progress {
            current: 2,
            total: 5,
        })
        .unwrap();
        assert_eq!(json["event"], "progress");
        assert_eq!(json["current"], 2);
        assert_eq!(json["total"], 5);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.on_status("hello");
        sink.on_font_fallback();
        sink.on_progress(1, 1);
        assert_eq!(
            sink.events(),
            vec![
                ProgressEvent::Status {
                    message: "hello".to_string()
                },
                ProgressEvent::FontFallback,
                ProgressEvent::Progress {
                    current: 1,
                    total: 1
                },
            ]
        );
        assert_eq!(sink.fallback_count(), 1);
    }

    #[tokio::test]
    async fn channel_sink_forwards_to_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);

        std::thread::spawn(move || {
            sink.on_progress(1, 2);
            sink.on_cancelled(1);
        })
        .join()
        .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(ProgressEvent::Progress {
                current: 1,
                total: 2
            })
        );
        assert_eq!(rx.recv().await, Some(ProgressEvent::Cancelled { completed: 1 }));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelSink::new(tx).on_status("nobody listening");
    }
}
