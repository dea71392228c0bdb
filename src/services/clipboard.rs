//! Clipboard and notification sinks.
//!
//! The core only defines the interface and a few in-process implementations.
//! Hosts plug in their own; the `runtime` feature adds [`SystemClipboard`]
//! backed by the platform clipboard.

use std::borrow::Cow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is not available: {0}")]
    Unavailable(String),
    #[error("clipboard error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Accepts text to place on the clipboard.
pub trait ClipboardSink {
    fn name(&self) -> Cow<'_, str>;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Displays a short message to the user.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Clipboard kept in memory. Can be told to fail, which is how hosts without
/// a clipboard and tests exercise the failure path.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
    fail_with: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            contents: None,
            fail_with: Some(reason.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn name(&self) -> Cow<'_, str> {
        "memory".into()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if let Some(reason) = &self.fail_with {
            return Err(ClipboardError::Unavailable(reason.clone()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Keeps every message, most recent last.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    messages: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The message currently on screen. A new notification supersedes the
    /// previous one.
    pub fn current(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Sends notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        tracing::info!("{message}");
    }
}

/// The platform clipboard.
#[cfg(feature = "runtime")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "runtime")]
impl SystemClipboard {
    pub fn new() -> Result<Self> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

#[cfg(feature = "runtime")]
impl ClipboardSink for SystemClipboard {
    fn name(&self) -> Cow<'_, str> {
        "system".into()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .map_err(|e| ClipboardError::Platform(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());
        clipboard.write_text("hello").unwrap();
        assert_eq!(clipboard.contents(), Some("hello"));
    }

    #[test]
    fn test_failing_clipboard() {
        let mut clipboard = MemoryClipboard::failing("no display");
        let err = clipboard.write_text("hello").unwrap_err();
        assert!(err.to_string().contains("no display"));
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_recording_notifier_last_wins() {
        let mut notifier = RecordingNotifier::new();
        notifier.notify("one");
        notifier.notify("two");
        assert_eq!(notifier.current(), Some("two"));
        assert_eq!(notifier.messages().len(), 2);
    }
}
