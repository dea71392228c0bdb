//! Interaction controller.
//!
//! One delegated handler per surface. Events carry an offset (live surface)
//! or a node path (static surface); the controller looks up the hidden link
//! under it on demand. No handler is attached to individual links.
//!
//! Behaviour:
//! - hover shows the payload in a tooltip, leave hides it
//! - click (or the copy chord with the caret on a link) copies the payload
//!   and notifies; a clipboard failure only produces a failure notification
//! - double click selects the whole link syntax
//! - a user selection that cuts into links is widened to cover them; the
//!   corrective selection is programmatic and is not widened again

use std::ops::Range;

use crossterm::event::KeyEvent;

use crate::config::{HiddenLinkSettings, COPY_FAILED_TEXT};
use crate::model::content::Node;
use crate::model::document::Document;
use crate::model::selection::{Selection, SelectionOrigin};
use crate::primitives::keychord::KeyChord;
use crate::primitives::pattern::LinkPattern;
use crate::primitives::scanner::{find_at, find_overlapping, HiddenLink};
use crate::services::clipboard::{ClipboardSink, Notifier};
use crate::view::decoration::DecorationSet;
use crate::view::static_render::{link_at, PAYLOAD_ATTRIBUTE};

/// Ephemeral tooltip state. Only one tooltip exists at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub text: String,
    /// Document range of the hovered link (live surface only)
    pub range: Option<Range<usize>>,
}

/// A command the controller asks the editing surface to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Replace the selection. Always programmatic.
    SetSelection(Selection),
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// The event was consumed; the surface should not run its default action
    pub handled: bool,
    pub command: Option<SurfaceCommand>,
}

impl EventOutcome {
    pub const IGNORED: EventOutcome = EventOutcome {
        handled: false,
        command: None,
    };

    pub const HANDLED: EventOutcome = EventOutcome {
        handled: true,
        command: None,
    };

    fn select(selection: Selection) -> Self {
        Self {
            handled: true,
            command: Some(SurfaceCommand::SetSelection(selection)),
        }
    }
}

/// Outcome of a copy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

/// Clipboard and notification sinks for one event.
pub struct Sinks<'a> {
    pub clipboard: &'a mut dyn ClipboardSink,
    pub notifier: &'a mut dyn Notifier,
}

/// Events from the live editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Hover { offset: usize },
    Leave,
    Click { offset: usize },
    DoubleClick { offset: usize },
    Key(KeyEvent),
    SelectionChanged {
        selection: Selection,
        origin: SelectionOrigin,
    },
}

/// Events from the static rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticEvent {
    Hover { path: Vec<usize> },
    Leave,
    Click { path: Vec<usize> },
}

/// State a live event is handled against.
pub struct LiveContext<'a> {
    pub document: &'a Document,
    pub selection: Selection,
    pub decorations: &'a DecorationSet,
    pub settings: &'a HiddenLinkSettings,
}

/// Handles pointer, keyboard and selection events for hidden links.
#[derive(Debug, Default, Clone)]
pub struct InteractionController {
    tooltip: Option<Tooltip>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tooltip currently shown, if any.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Single entry point for the live surface.
    pub fn handle_live(
        &mut self,
        event: &LiveEvent,
        ctx: &LiveContext<'_>,
        sinks: &mut Sinks<'_>,
    ) -> EventOutcome {
        match event {
            LiveEvent::Hover { offset } => {
                self.hover(ctx.decorations, *offset);
                EventOutcome::IGNORED
            }
            LiveEvent::Leave => {
                self.leave();
                EventOutcome::IGNORED
            }
            LiveEvent::Click { offset } => {
                self.click(ctx.decorations, *offset, ctx.settings, sinks)
            }
            LiveEvent::DoubleClick { offset } => {
                self.double_click(ctx.document, *offset, ctx.settings)
            }
            LiveEvent::Key(key) => {
                self.key(key, ctx.document, ctx.selection, ctx.settings, sinks)
            }
            LiveEvent::SelectionChanged { selection, origin } => {
                self.selection_changed(ctx.document, *selection, *origin, ctx.settings)
            }
        }
    }

    /// Single entry point for the static surface.
    pub fn handle_static(
        &mut self,
        event: &StaticEvent,
        container: &Node,
        settings: &HiddenLinkSettings,
        sinks: &mut Sinks<'_>,
    ) -> EventOutcome {
        match event {
            StaticEvent::Hover { path } => {
                self.tooltip = payload_at_path(container, path).map(|payload| Tooltip {
                    text: payload.to_string(),
                    range: None,
                });
                EventOutcome::IGNORED
            }
            StaticEvent::Leave => {
                self.leave();
                EventOutcome::IGNORED
            }
            StaticEvent::Click { path } => match payload_at_path(container, path) {
                Some(payload) => {
                    copy_payload(payload, settings, sinks);
                    EventOutcome::HANDLED
                }
                None => EventOutcome::IGNORED,
            },
        }
    }

    /// Show the payload of the link under `offset`, replacing any tooltip.
    pub fn hover(&mut self, decorations: &DecorationSet, offset: usize) {
        self.tooltip = decorations.at(offset).map(|d| Tooltip {
            text: d.payload.clone(),
            range: Some(d.range.clone()),
        });
    }

    pub fn leave(&mut self) {
        self.tooltip = None;
    }

    /// Copy the payload of the link under `offset`, collapsed or expanded.
    pub fn click(
        &mut self,
        decorations: &DecorationSet,
        offset: usize,
        settings: &HiddenLinkSettings,
        sinks: &mut Sinks<'_>,
    ) -> EventOutcome {
        match decorations.at(offset) {
            Some(decoration) => {
                copy_payload(&decoration.payload, settings, sinks);
                EventOutcome::HANDLED
            }
            None => EventOutcome::IGNORED,
        }
    }

    /// Select the whole link syntax around `offset`.
    pub fn double_click(
        &self,
        document: &Document,
        offset: usize,
        settings: &HiddenLinkSettings,
    ) -> EventOutcome {
        match link_at_offset(document, offset, settings) {
            Some(link) => EventOutcome::select(Selection::new(link.start, link.end)),
            None => EventOutcome::IGNORED,
        }
    }

    /// Copy chord handler. Returns a handled outcome only if the chord
    /// matched and the caret is on a link.
    pub fn key(
        &mut self,
        key: &KeyEvent,
        document: &Document,
        selection: Selection,
        settings: &HiddenLinkSettings,
        sinks: &mut Sinks<'_>,
    ) -> EventOutcome {
        if !copy_chord(settings).matches(key) {
            return EventOutcome::IGNORED;
        }

        match link_at_offset(document, selection.from, settings) {
            Some(link) => {
                copy_payload(&link.payload, settings, sinks);
                EventOutcome::HANDLED
            }
            None => EventOutcome::IGNORED,
        }
    }

    /// Widen a user selection to cover every link it cuts into.
    pub fn selection_changed(
        &self,
        document: &Document,
        selection: Selection,
        origin: SelectionOrigin,
        settings: &HiddenLinkSettings,
    ) -> EventOutcome {
        if origin != SelectionOrigin::User || selection.is_caret() {
            return EventOutcome::IGNORED;
        }

        let selection = selection.clamp(document.len());
        let pattern = LinkPattern::compile(&settings.delimiters());
        let first = document.line_at(selection.from).number;
        let last = document.line_at(selection.to).number;

        let widened = (first..=last)
            .filter_map(|n| document.line(n))
            .flat_map(|line| {
                find_overlapping(line.text, line.from, &pattern, selection.from, selection.to)
            })
            .fold(selection, |acc, link| {
                acc.union(Selection::new(link.start, link.end))
            });

        if widened == selection {
            return EventOutcome::IGNORED;
        }

        tracing::debug!(
            "[hidden-link] widening selection {:?} to {:?}",
            selection.range(),
            widened.range()
        );
        EventOutcome {
            handled: false,
            command: Some(SurfaceCommand::SetSelection(widened)),
        }
    }
}

/// Copy `payload` and notify the outcome.
pub fn copy_payload(
    payload: &str,
    settings: &HiddenLinkSettings,
    sinks: &mut Sinks<'_>,
) -> CopyOutcome {
    match sinks.clipboard.write_text(payload) {
        Ok(()) => {
            sinks.notifier.notify(&settings.notification_text);
            CopyOutcome::Copied
        }
        Err(e) => {
            tracing::error!(
                "Clipboard write failed ({}): {}",
                sinks.clipboard.name(),
                e
            );
            sinks.notifier.notify(COPY_FAILED_TEXT);
            CopyOutcome::Failed
        }
    }
}

/// The hidden link whose syntax contains `offset`, found by rescanning the
/// line that owns it.
pub fn link_at_offset(
    document: &Document,
    offset: usize,
    settings: &HiddenLinkSettings,
) -> Option<HiddenLink> {
    let pattern = LinkPattern::compile(&settings.delimiters());
    let line = document.line_at(offset);
    find_at(line.text, line.from, &pattern, offset)
}

fn copy_chord(settings: &HiddenLinkSettings) -> KeyChord {
    settings.copy_chord().unwrap_or_else(|e| {
        tracing::warn!(
            "invalid copy shortcut {:?} ({e}); using {}",
            settings.copy_shortcut,
            crate::config::DEFAULT_COPY_SHORTCUT
        );
        HiddenLinkSettings::default()
            .copy_chord()
            .unwrap_or(KeyChord::new(
                crossterm::event::KeyCode::Enter,
                crossterm::event::KeyModifiers::ALT,
            ))
    })
}

fn payload_at_path<'a>(container: &'a Node, path: &[usize]) -> Option<&'a str> {
    link_at(container, path)?.attribute(PAYLOAD_ATTRIBUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clipboard::{MemoryClipboard, RecordingNotifier};
    use crate::view::decoration::build_decorations;
    use crossterm::event::{KeyCode, KeyModifiers};

    const SCENARIO: &str = "Contact ::secret@example.com|Email Me::.";

    fn decorations(doc: &Document, selection: Selection) -> DecorationSet {
        let pattern = LinkPattern::compile(&HiddenLinkSettings::default().delimiters());
        build_decorations(doc, selection, &pattern)
    }

    #[test]
    fn test_click_copies_payload() {
        let settings = HiddenLinkSettings::default();
        let doc = Document::new(SCENARIO);
        let set = decorations(&doc, Selection::caret(0));
        let mut clipboard = MemoryClipboard::new();
        let mut notifier = RecordingNotifier::new();
        let mut sinks = Sinks {
            clipboard: &mut clipboard,
            notifier: &mut notifier,
        };

        let mut controller = InteractionController::new();
        let outcome = controller.click(&set, 12, &settings, &mut sinks);
        assert_eq!(outcome, EventOutcome::HANDLED);

        let miss = controller.click(&set, 2, &settings, &mut sinks);
        assert_eq!(miss, EventOutcome::IGNORED);

        assert_eq!(clipboard.contents(), Some("secret@example.com"));
        assert_eq!(notifier.messages(), ["Copied to clipboard!"]);
    }

    #[test]
    fn test_copy_failure_notifies() {
        let settings = HiddenLinkSettings::default();
        let mut clipboard = MemoryClipboard::failing("denied");
        let mut notifier = RecordingNotifier::new();
        let mut sinks = Sinks {
            clipboard: &mut clipboard,
            notifier: &mut notifier,
        };

        assert_eq!(copy_payload("x", &settings, &mut sinks), CopyOutcome::Failed);
        assert_eq!(notifier.current(), Some(COPY_FAILED_TEXT));
    }

    #[test]
    fn test_hover_and_leave() {
        let doc = Document::new(SCENARIO);
        let set = decorations(&doc, Selection::caret(0));
        let mut controller = InteractionController::new();

        controller.hover(&set, 20);
        let tooltip = controller.tooltip().unwrap();
        assert_eq!(tooltip.text, "secret@example.com");
        assert_eq!(tooltip.range, Some(8..39));

        controller.hover(&set, 1);
        assert!(controller.tooltip().is_none());

        controller.hover(&set, 20);
        controller.leave();
        assert!(controller.tooltip().is_none());
    }

    #[test]
    fn test_double_click_selects_whole_link() {
        let settings = HiddenLinkSettings::default();
        let doc = Document::new(SCENARIO);
        let controller = InteractionController::new();

        let outcome = controller.double_click(&doc, 20, &settings);
        assert_eq!(
            outcome.command,
            Some(SurfaceCommand::SetSelection(Selection::new(8, 39)))
        );
        assert!(outcome.handled);

        assert_eq!(controller.double_click(&doc, 3, &settings), EventOutcome::IGNORED);
    }

    #[test]
    fn test_copy_chord() {
        let settings = HiddenLinkSettings::default();
        let doc = Document::new(SCENARIO);
        let mut clipboard = MemoryClipboard::new();
        let mut notifier = RecordingNotifier::new();
        let mut sinks = Sinks {
            clipboard: &mut clipboard,
            notifier: &mut notifier,
        };
        let mut controller = InteractionController::new();
        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        let plain_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

        // Caret outside the link: not consumed
        let outcome = controller.key(&alt_enter, &doc, Selection::caret(2), &settings, &mut sinks);
        assert!(!outcome.handled);

        // Wrong chord
        let outcome = controller.key(&plain_enter, &doc, Selection::caret(10), &settings, &mut sinks);
        assert!(!outcome.handled);

        let outcome = controller.key(&alt_enter, &doc, Selection::caret(10), &settings, &mut sinks);
        assert!(outcome.handled);
        assert_eq!(clipboard.contents(), Some("secret@example.com"));
    }

    #[test]
    fn test_custom_copy_chord() {
        let settings = HiddenLinkSettings {
            copy_shortcut: "Ctrl-y".to_string(),
            ..Default::default()
        };
        let doc = Document::new(SCENARIO);
        let mut clipboard = MemoryClipboard::new();
        let mut notifier = RecordingNotifier::new();
        let mut sinks = Sinks {
            clipboard: &mut clipboard,
            notifier: &mut notifier,
        };
        let mut controller = InteractionController::new();

        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert!(!controller.key(&alt_enter, &doc, Selection::caret(10), &settings, &mut sinks).handled);

        let ctrl_y = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert!(controller.key(&ctrl_y, &doc, Selection::caret(10), &settings, &mut sinks).handled);
    }

    #[test]
    fn test_user_selection_widens() {
        let settings = HiddenLinkSettings::default();
        let doc = Document::new("ab ::p|d:: cd ::q|e:: ef");
        let controller = InteractionController::new();

        // Cuts into the first link only
        let outcome =
            controller.selection_changed(&doc, Selection::new(1, 5), SelectionOrigin::User, &settings);
        assert_eq!(
            outcome.command,
            Some(SurfaceCommand::SetSelection(Selection::new(1, 10)))
        );

        // Spans into both
        let outcome =
            controller.selection_changed(&doc, Selection::new(6, 15), SelectionOrigin::User, &settings);
        assert_eq!(
            outcome.command,
            Some(SurfaceCommand::SetSelection(Selection::new(3, 21)))
        );
    }

    #[test]
    fn test_selection_not_widened() {
        let settings = HiddenLinkSettings::default();
        let doc = Document::new("ab ::p|d:: cd");
        let controller = InteractionController::new();

        // Programmatic selections are left alone
        let outcome = controller.selection_changed(
            &doc,
            Selection::new(1, 5),
            SelectionOrigin::Programmatic,
            &settings,
        );
        assert_eq!(outcome, EventOutcome::IGNORED);

        // Already covering the link: no correction, so no loop
        let outcome =
            controller.selection_changed(&doc, Selection::new(3, 10), SelectionOrigin::User, &settings);
        assert_eq!(outcome, EventOutcome::IGNORED);

        // Caret only
        let outcome =
            controller.selection_changed(&doc, Selection::caret(5), SelectionOrigin::User, &settings);
        assert_eq!(outcome, EventOutcome::IGNORED);

        // Touching the edge without overlapping
        let outcome =
            controller.selection_changed(&doc, Selection::new(10, 12), SelectionOrigin::User, &settings);
        assert_eq!(outcome, EventOutcome::IGNORED);
    }

    #[test]
    fn test_selection_widens_across_lines() {
        let settings = HiddenLinkSettings::default();
        let doc = Document::new("x ::a|b::\ny ::c|d:: z");
        let controller = InteractionController::new();

        let outcome =
            controller.selection_changed(&doc, Selection::new(5, 14), SelectionOrigin::User, &settings);
        assert_eq!(
            outcome.command,
            Some(SurfaceCommand::SetSelection(Selection::new(2, 19)))
        );
    }

    #[test]
    fn test_static_surface_events() {
        use crate::model::content::Element;
        use crate::view::static_render::{render_container, Strategy};

        let settings = HiddenLinkSettings::default();
        let pattern = LinkPattern::compile(&settings.delimiters());
        let mut root: Node = Element::new("p").with_text(SCENARIO).into();
        render_container(&mut root, &pattern, Strategy::Container);

        let mut clipboard = MemoryClipboard::new();
        let mut notifier = RecordingNotifier::new();
        let mut sinks = Sinks {
            clipboard: &mut clipboard,
            notifier: &mut notifier,
        };
        let mut controller = InteractionController::new();

        let hover = StaticEvent::Hover { path: vec![1, 0] };
        controller.handle_static(&hover, &root, &settings, &mut sinks);
        assert_eq!(controller.tooltip().unwrap().text, "secret@example.com");

        let click = StaticEvent::Click { path: vec![1] };
        assert!(controller.handle_static(&click, &root, &settings, &mut sinks).handled);

        let miss = StaticEvent::Click { path: vec![0] };
        assert!(!controller.handle_static(&miss, &root, &settings, &mut sinks).handled);

        controller.handle_static(&StaticEvent::Leave, &root, &settings, &mut sinks);
        assert!(controller.tooltip().is_none());
        drop(sinks);
        assert_eq!(clipboard.contents(), Some("secret@example.com"));
    }
}
