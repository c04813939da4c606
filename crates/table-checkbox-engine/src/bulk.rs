//! Whole-document conversion.
//!
//! Spans are collected for every line first, identifiers are allocated for
//! all of them up front, and the text is then rebuilt in two phases:
//! recorded spans become placeholders, then placeholders become controls.
//! Working from recorded offsets means no span has to be recomputed after an
//! earlier replacement shifts the text.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::control::{CheckState, render_checkbox};
use crate::document::{DocumentService, Span};
use crate::ids::{IdAllocator, IdSource, UuidSource};
use crate::matcher::{find_all_checkbox_spans, is_checkbox_in_table_context};

/// Marker written in place of each token between the two phases
pub const PLACEHOLDER: &str = "%%TABLE_CHECKBOX%%";

/// Which lines bulk conversion may touch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionPolicy {
    /// Convert checkbox tokens on any line, not only table rows
    pub convert_checkboxes_outside_tables: bool,
}

impl ConversionPolicy {
    pub fn everywhere() -> Self {
        Self {
            convert_checkboxes_outside_tables: true,
        }
    }

    fn accepts(&self, line: &str) -> bool {
        self.convert_checkboxes_outside_tables || is_checkbox_in_table_context(line)
    }
}

/// Result of one bulk conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkConversion {
    /// Converted document text
    pub text: String,
    /// Identifiers issued, in document order
    pub ids: Vec<String>,
    /// Replaced spans, in coordinates of the original text
    pub spans: Vec<Span>,
}

impl BulkConversion {
    pub fn converted(&self) -> usize {
        self.ids.len()
    }

    pub fn is_noop(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Every convertible span in the document, in document order
pub fn collect_spans(text: &str, policy: ConversionPolicy) -> Vec<Span> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| policy.accepts(line))
        .flat_map(|(index, line)| {
            find_all_checkbox_spans(line)
                .into_iter()
                .map(move |token| Span::on_line(index, token.span))
        })
        .collect()
}

/// Byte ranges of the same spans, relative to the whole text
fn absolute_ranges(text: &str, spans: &[Span]) -> Vec<Range<usize>> {
    let mut line_starts = vec![0];
    line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));

    spans
        .iter()
        .map(|span| {
            let start = line_starts[span.from.line] + span.from.ch;
            let end = line_starts[span.to.line] + span.to.ch;
            start..end
        })
        .collect()
}

/// Phase one: swap each range for the placeholder, noting where each landed
fn stage_placeholders(text: &str, ranges: &[Range<usize>]) -> (String, Vec<usize>) {
    let mut staged = String::with_capacity(text.len());
    let mut marks = Vec::with_capacity(ranges.len());
    let mut copied = 0;

    for range in ranges {
        staged.push_str(&text[copied..range.start]);
        marks.push(staged.len());
        staged.push_str(PLACEHOLDER);
        copied = range.end;
    }
    staged.push_str(&text[copied..]);

    (staged, marks)
}

/// Phase two: replace each staged placeholder with its control, in order
fn substitute_placeholders(staged: &str, marks: &[usize], ids: &[String]) -> String {
    let mut out = String::with_capacity(staged.len() + ids.len() * 48);
    let mut copied = 0;

    for (mark, id) in marks.iter().zip(ids) {
        out.push_str(&staged[copied..*mark]);
        out.push_str(&render_checkbox(id, CheckState::Unchecked));
        copied = mark + PLACEHOLDER.len();
    }
    out.push_str(&staged[copied..]);

    out
}

/// Convert every eligible token in `text`
pub fn convert_all(text: &str, policy: ConversionPolicy) -> BulkConversion {
    convert_all_with(text, policy, UuidSource)
}

pub fn convert_all_with<S: IdSource>(
    text: &str,
    policy: ConversionPolicy,
    source: S,
) -> BulkConversion {
    let spans = collect_spans(text, policy);
    if spans.is_empty() {
        log::debug!("bulk conversion found no checkboxes");
        return BulkConversion {
            text: text.to_string(),
            ids: Vec::new(),
            spans,
        };
    }

    if text.contains(PLACEHOLDER) {
        log::warn!(
            "document already contains the placeholder {PLACEHOLDER:?}; leaving it untouched"
        );
    }

    // All ids are allocated before any text changes, so the allocator's own
    // issued set is what keeps them apart from each other
    let mut allocator = IdAllocator::with_source(text, source);
    let ids: Vec<String> = spans.iter().map(|_| allocator.allocate()).collect();

    let ranges = absolute_ranges(text, &spans);
    let (staged, marks) = stage_placeholders(text, &ranges);
    let converted = substitute_placeholders(&staged, &marks, &ids);

    log::debug!("bulk conversion replaced {} checkbox(es)", ids.len());

    BulkConversion {
        text: converted,
        ids,
        spans,
    }
}

/// Run bulk conversion against a live document, writing back only on change
pub fn convert_document<D: DocumentService + ?Sized>(
    doc: &mut D,
    policy: ConversionPolicy,
) -> BulkConversion {
    convert_document_with(doc, policy, UuidSource)
}

pub fn convert_document_with<D, S>(
    doc: &mut D,
    policy: ConversionPolicy,
    source: S,
) -> BulkConversion
where
    D: DocumentService + ?Sized,
    S: IdSource,
{
    let result = convert_all_with(&doc.text(), policy, source);
    if !result.is_noop() {
        doc.set_text(&result.text);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::list_controls;
    use crate::document::EditorDocument;
    use crate::ids::testing::ScriptedSource;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    const TABLE: &str = "\
# Sprint

| task   | done  |
|--------|-------|
| design | - [ ] |
| build  | -[]   |
> | quoted | - [] |

- [ ] plain list item
";

    #[test]
    fn test_table_rows_converted_in_order() {
        let source = ScriptedSource::new(&["aaa111", "bbb222", "ccc333"], &[]);
        let result = convert_all_with(TABLE, ConversionPolicy::default(), source);

        assert_eq!(result.ids, vec!["aaa111", "bbb222", "ccc333"]);
        assert_eq!(
            result.text,
            "\
# Sprint

| task   | done  |
|--------|-------|
| design | <input type=\"checkbox\" unchecked id=\"aaa111\"> |
| build  | <input type=\"checkbox\" unchecked id=\"bbb222\">   |
> | quoted | <input type=\"checkbox\" unchecked id=\"ccc333\"> |

- [ ] plain list item
"
        );
    }

    #[test]
    fn test_spans_reported_in_original_coordinates() {
        let spans = collect_spans(TABLE, ConversionPolicy::default());
        assert_eq!(
            spans,
            vec![
                Span::on_line(4, 11..16),
                Span::on_line(5, 11..14),
                Span::on_line(6, 13..17),
            ]
        );
    }

    #[test]
    fn test_policy_gates_non_table_lines() {
        let text = "- [ ] plain list item\n";

        let kept = convert_all(text, ConversionPolicy::default());
        assert!(kept.is_noop());
        assert_eq!(kept.text, text);

        let converted = convert_all(text, ConversionPolicy::everywhere());
        assert_eq!(converted.converted(), 1);
        assert!(!converted.text.contains("- [ ]"));
        assert!(converted.text.ends_with(" plain list item\n"));
    }

    #[test]
    fn test_second_pass_is_noop() {
        // Given
        let first = convert_all(TABLE, ConversionPolicy::everywhere());

        // When
        let second = convert_all(&first.text, ConversionPolicy::everywhere());

        // Then
        assert!(second.is_noop());
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_batch_ids_unique_even_when_source_repeats() {
        // Given
        let text = "| - [ ] | - [ ] | - [ ] |\n| old | <input type=\"checkbox\" checked id=\"dup000\"> |";
        let source = ScriptedSource::new(&["dup000", "same11", "same11"], &["long01", "long02"]);

        // When
        let result = convert_all_with(text, ConversionPolicy::default(), source);

        // Then
        assert_eq!(result.ids, vec!["long01", "same11", "long02"]);

        let all: Vec<String> = list_controls(&result.text).into_iter().map(|c| c.id).collect();
        let unique: HashSet<&String> = all.iter().collect();
        assert_eq!(all.len(), 4);
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_many_checkboxes_get_distinct_ids() {
        let text = "| - [ ] | - [ ] |\n".repeat(50);
        let result = convert_all(&text, ConversionPolicy::default());

        let unique: HashSet<&String> = result.ids.iter().collect();
        assert_eq!(result.converted(), 100);
        assert_eq!(unique.len(), 100);
        for id in &result.ids {
            assert!(!text.contains(id.as_str()));
        }
    }

    #[test]
    fn test_existing_placeholder_text_survives() {
        // Given
        let text = format!("literal {PLACEHOLDER} in prose\n| - [ ] |\n");
        let source = ScriptedSource::new(&["abc123"], &[]);

        // When
        let result = convert_all_with(&text, ConversionPolicy::default(), source);

        // Then
        assert_eq!(
            result.text,
            format!(
                "literal {PLACEHOLDER} in prose\n| <input type=\"checkbox\" unchecked id=\"abc123\"> |\n"
            )
        );
    }

    #[test]
    fn test_crlf_lines_converted() {
        let text = "| a | - [ ] |\r\n| b | -[] |\r\n";
        let source = ScriptedSource::new(&["one111", "two222"], &[]);
        let result = convert_all_with(text, ConversionPolicy::default(), source);

        assert_eq!(
            result.text,
            "| a | <input type=\"checkbox\" unchecked id=\"one111\"> |\r\n| b | <input type=\"checkbox\" unchecked id=\"two222\"> |\r\n"
        );
    }

    #[test]
    fn test_convert_document_updates_buffer() {
        // Given
        let mut doc = EditorDocument::from_text("| a | - [ ] |");
        let source = ScriptedSource::new(&["abc123"], &[]);

        // When
        let result = convert_document_with(&mut doc, ConversionPolicy::default(), source);

        // Then
        assert_eq!(result.converted(), 1);
        assert_eq!(doc.text(), r#"| a | <input type="checkbox" unchecked id="abc123"> |"#);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_convert_document_without_matches_does_not_touch_buffer() {
        let mut doc = EditorDocument::from_text("nothing to see");
        let result = convert_document(&mut doc, ConversionPolicy::default());

        assert!(result.is_noop());
        assert_eq!(doc.version(), 0);
    }
}
