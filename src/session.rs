//! Surface wiring.
//!
//! [`LiveSession`] plays the part of an editable surface with the hidden link
//! extension installed: it owns document text and selection, forwards every
//! change to the decorator and controller, and applies the selection commands
//! they issue. [`post_process`] is the one-shot hook for a static surface.
//!
//! Each pass takes a fresh settings snapshot, so a settings edit applies from
//! the next pass on.

use crate::config::{HiddenLinkSettings, SettingsStore};
use crate::model::content::{Element, Node};
use crate::model::document::Document;
use crate::model::selection::{Selection, SelectionOrigin};
use crate::primitives::pattern::LinkPattern;
use crate::primitives::scanner::{scan, HiddenLink};
use crate::input::controller::{
    EventOutcome, InteractionController, LiveContext, LiveEvent, Sinks, SurfaceCommand,
};
use crate::view::decoration::{DecorationSet, LiveDecorator, ViewUpdate};
use crate::view::static_render::{render_container, Strategy};

/// An editable document with hidden link decorations kept current.
#[derive(Debug, Clone)]
pub struct LiveSession {
    document: Document,
    selection: Selection,
    settings: SettingsStore,
    decorator: LiveDecorator,
    controller: InteractionController,
}

impl LiveSession {
    pub fn new(text: impl Into<String>, settings: SettingsStore) -> Self {
        let document = Document::new(text);
        let selection = Selection::caret(0);
        let decorator = LiveDecorator::new(&document, selection, &settings.snapshot());
        Self {
            document,
            selection,
            settings,
            decorator,
            controller: InteractionController::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn decorations(&self) -> &DecorationSet {
        self.decorator.decorations()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// What the reader currently sees.
    pub fn rendered_text(&self) -> String {
        self.decorations().render_document(&self.document)
    }

    /// Replace the document text. The selection is clamped to the new length.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.document = Document::new(text);
        self.selection = self.selection.clamp(self.document.len());
        self.notify(true, false);
    }

    /// Change the selection. User selections may be widened to cover the
    /// links they cut into; the widening is applied as a programmatic
    /// selection, which is never widened again.
    pub fn set_selection(&mut self, selection: Selection, origin: SelectionOrigin) {
        self.selection = selection.clamp(self.document.len());
        self.notify(false, true);

        let settings = self.settings.snapshot();
        let outcome =
            self.controller
                .selection_changed(&self.document, self.selection, origin, &settings);
        self.apply(outcome);
    }

    /// Edit settings, persist them best effort, and redecorate.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut HiddenLinkSettings)) {
        self.settings.update(edit);
        if let Err(e) = self.settings.save() {
            tracing::warn!("failed to save hidden link settings: {e}");
        }
        self.decorator
            .rebuild(&self.document, self.selection, &self.settings.snapshot());
    }

    /// Route a pointer or keyboard event through the controller.
    pub fn dispatch(&mut self, event: &LiveEvent, sinks: &mut Sinks<'_>) -> EventOutcome {
        if let LiveEvent::SelectionChanged { selection, origin } = event {
            self.set_selection(*selection, *origin);
            return EventOutcome::IGNORED;
        }

        let settings = self.settings.snapshot();
        let ctx = LiveContext {
            document: &self.document,
            selection: self.selection,
            decorations: self.decorator.decorations(),
            settings: &settings,
        };
        let outcome = self.controller.handle_live(event, &ctx, sinks);
        self.apply(outcome);
        outcome
    }

    fn apply(&mut self, outcome: EventOutcome) {
        if let Some(SurfaceCommand::SetSelection(selection)) = outcome.command {
            self.set_selection(selection, SelectionOrigin::Programmatic);
        }
    }

    fn notify(&mut self, doc_changed: bool, selection_set: bool) {
        let settings = self.settings.snapshot();
        let update = ViewUpdate {
            document: &self.document,
            selection: self.selection,
            doc_changed,
            selection_set,
        };
        self.decorator.update(&update, &settings);
    }
}

/// Replace hidden links in a rendered container using the current settings.
/// Returns the number of links replaced.
pub fn post_process(container: &mut Node, settings: &SettingsStore, strategy: Strategy) -> usize {
    let snapshot = settings.snapshot();
    let pattern = LinkPattern::compile(&snapshot.delimiters());
    render_container(container, &pattern, strategy)
}

/// Lay out a plain document the way a line-oriented renderer would: a `div`
/// holding one `p` per line.
pub fn document_container(document: &Document) -> Node {
    document
        .lines()
        .fold(Element::new("div"), |div, line| {
            let paragraph = match line.text {
                "" => Element::new("p"),
                text => Element::new("p").with_text(text),
            };
            div.with_child(paragraph.into())
        })
        .into()
}

/// Every hidden link in `document`, paired with its 1-based line number.
pub fn document_links(
    document: &Document,
    settings: &HiddenLinkSettings,
) -> Vec<(usize, HiddenLink)> {
    let pattern = LinkPattern::compile(&settings.delimiters());
    document
        .lines()
        .flat_map(|line| {
            scan(line.text, line.from, &pattern)
                .map(|link| (line.number, link))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clipboard::{MemoryClipboard, RecordingNotifier};

    #[test]
    fn test_correction_does_not_loop() {
        let mut session = LiveSession::new("ab ::p|d:: cd", SettingsStore::default());
        session.set_selection(Selection::new(1, 5), SelectionOrigin::User);
        assert_eq!(session.selection(), Selection::new(1, 10));
    }

    #[test]
    fn test_double_click_updates_selection() {
        let mut session = LiveSession::new("ab ::p|d:: cd", SettingsStore::default());
        let mut clipboard = MemoryClipboard::new();
        let mut notifier = RecordingNotifier::new();
        let mut sinks = Sinks {
            clipboard: &mut clipboard,
            notifier: &mut notifier,
        };

        let outcome = session.dispatch(&LiveEvent::DoubleClick { offset: 5 }, &mut sinks);
        assert!(outcome.handled);
        assert_eq!(session.selection(), Selection::new(3, 10));
        assert_eq!(session.rendered_text(), "ab ::p|d:: cd");
    }

    #[test]
    fn test_document_container_keeps_lines_apart() {
        let document = Document::new("one ::a|\n::b|two:: three\n\n::c|C::");
        let mut container = document_container(&document);
        let replaced = post_process(&mut container, &SettingsStore::default(), Strategy::Container);

        assert_eq!(replaced, 2);
        let lines: Vec<_> = container
            .as_element()
            .map(|div| div.children.iter().map(Node::text_content).collect())
            .unwrap_or_default();
        assert_eq!(lines, vec!["one ::a|", "two three", "", "C"]);
    }

    #[test]
    fn test_document_links_by_line() {
        let document = Document::new("x ::p|d::\r\nnone\n::q|e:: ::r|f::");
        let links = document_links(&document, &HiddenLinkSettings::default());
        let summary: Vec<_> = links
            .iter()
            .map(|(line, link)| (*line, link.range(), link.payload.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![(1, 2..9, "p"), (3, 16..23, "q"), (3, 24..31, "r")]
        );
    }

    #[test]
    fn test_settings_change_redecorates() {
        let mut session = LiveSession::new("x ::secret|Email Me::", SettingsStore::default());
        assert_eq!(session.rendered_text(), "x Email Me");

        session.update_settings(|s| s.separator = "~".to_string());
        assert_eq!(session.rendered_text(), "x ::secret|Email Me::");

        session.set_text("x ::secret~Email Me::");
        assert_eq!(session.rendered_text(), "x Email Me");
    }
}
