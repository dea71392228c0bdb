//! Shadow model tests for live decorations.
//!
//! The decoration builder is run side by side with a byte-by-byte model of
//! the default `::payload|display::` syntax. For every random document and
//! selection the two must agree on every link range, payload, display text
//! and collapsed/expanded state, and on the rendered text.

use hidelink::config::DelimiterConfig;
use hidelink::model::document::Document;
use hidelink::model::selection::Selection;
use hidelink::primitives::pattern::LinkPattern;
use hidelink::view::decoration::{build_decorations, DecorationKind, EXPANDED_CLASS};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModelLink {
    start: usize,
    end: usize,
    payload: String,
    display: String,
    collapsed: bool,
}

fn find_from(bytes: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len().saturating_sub(needle.len() - 1)).find(|&i| bytes[i..].starts_with(needle))
}

/// Leftmost match at or after `pos`: the first `|` after a `::`, then the
/// first `::` after that `|`.
fn model_scan_line(line: &str, base: usize) -> Vec<(usize, usize, String, String)> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;

    'outer: while pos < bytes.len() {
        let mut candidate = pos;
        while let Some(start) = find_from(bytes, b"::", candidate) {
            let found = find_from(bytes, b"|", start + 2)
                .and_then(|sep| find_from(bytes, b"::", sep + 1).map(|end| (sep, end)));
            if let Some((sep, end)) = found {
                out.push((
                    base + start,
                    base + end + 2,
                    line[start + 2..sep].trim().to_string(),
                    line[sep + 1..end].trim().to_string(),
                ));
                pos = end + 2;
                continue 'outer;
            }
            candidate = start + 1;
        }
        break;
    }
    out
}

fn model(text: &str, selection: Selection) -> Vec<ModelLink> {
    let mut links = Vec::new();
    let mut base = 0;
    for line in text.split('\n') {
        for (start, end, payload, display) in model_scan_line(line, base) {
            let caret_inside = start <= selection.from && selection.from <= end;
            let touches = selection.from <= end && selection.to >= start;
            links.push(ModelLink {
                start,
                end,
                payload,
                display,
                collapsed: !(caret_inside || touches),
            });
        }
        base += line.len() + 1;
    }
    links
}

fn model_render(text: &str, links: &[ModelLink]) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    for link in links.iter().filter(|l| l.collapsed) {
        out.push_str(&text[cursor..link.start]);
        out.push_str(&link.display);
        cursor = link.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => Just(':'),
            2 => Just('|'),
            3 => prop::char::range('a', 'e'),
            1 => Just(' '),
            1 => Just('\n'),
        ],
        0..60,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn case_strategy() -> impl Strategy<Value = (String, Selection)> {
    text_strategy().prop_flat_map(|text| {
        let len = text.len();
        (Just(text), 0..=len, 0..=len).prop_map(|(text, a, b)| (text, Selection::new(a, b)))
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_decorations_match_shadow_model((text, selection) in case_strategy()) {
        let document = Document::new(text.clone());
        let pattern = LinkPattern::compile(&DelimiterConfig::default());
        let decorations = build_decorations(&document, selection, &pattern);
        let expected = model(&text, selection);

        prop_assert_eq!(decorations.len(), expected.len(), "text: {:?}", text);
        for (actual, want) in decorations.iter().zip(&expected) {
            prop_assert_eq!(actual.range.clone(), want.start..want.end);
            prop_assert_eq!(&actual.payload, &want.payload);
            let kind = if want.collapsed {
                DecorationKind::Replace { display: want.display.clone() }
            } else {
                DecorationKind::Mark { class: EXPANDED_CLASS }
            };
            prop_assert_eq!(&actual.kind, &kind);
        }

        prop_assert_eq!(decorations.render_document(&document), model_render(&text, &expected));
    }

    #[test]
    fn prop_decorations_are_ordered_and_disjoint((text, selection) in case_strategy()) {
        let document = Document::new(text);
        let pattern = LinkPattern::compile(&DelimiterConfig::default());
        let decorations = build_decorations(&document, selection, &pattern);

        for pair in decorations.iter().collect::<Vec<_>>().windows(2) {
            prop_assert!(pair[0].range.end <= pair[1].range.start);
        }
    }
}
