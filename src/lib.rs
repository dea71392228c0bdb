//! Hidden hyperlinks.
//!
//! A span written as `::payload|display::` is shown to the reader as just
//! `display`. The payload stays hidden until the reader hovers the link,
//! clicks it (or presses the copy chord) to copy it, or moves the caret onto
//! it, which reveals the raw syntax for editing.
//!
//! The crate is organised bottom-up:
//! - `primitives`: delimiter pattern compiler, span scanner, key chords
//! - `model`: document, selection and rendered content tree
//! - `view`: visibility resolver, live decorations, static replacement
//! - `input`: the interaction controller
//! - `services`: clipboard and notification sinks
//! - `session`: wiring for live and static surfaces
//!
//! # Example
//!
//! ```
//! use hidelink::config::SettingsStore;
//! use hidelink::session::LiveSession;
//!
//! let session = LiveSession::new("Contact ::secret@example.com|Email Me::.", SettingsStore::default());
//! assert_eq!(session.rendered_text(), "Contact Email Me.");
//! ```

pub mod config;
pub mod input;
pub mod model;
pub mod primitives;
pub mod services;
pub mod session;
pub mod view;
