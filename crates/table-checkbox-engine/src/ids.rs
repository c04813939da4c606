//! Identifier generation for rendered checkboxes.

use std::collections::HashSet;

use uuid::Uuid;

/// Length of the first candidate handed out for each identifier
pub const SHORT_ID_LEN: usize = 6;

/// Source of random identifier candidates.
///
/// Candidates must be non-empty; an empty string is contained in every
/// document and would never be accepted.
pub trait IdSource {
    /// First attempt: short and readable
    fn short_id(&mut self) -> String;
    /// Retry after a collision: long enough that collisions stop mattering
    fn long_id(&mut self) -> String;
}

impl<S: IdSource + ?Sized> IdSource for &mut S {
    fn short_id(&mut self) -> String {
        (**self).short_id()
    }

    fn long_id(&mut self) -> String {
        (**self).long_id()
    }
}

/// Hex digits of a v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn short_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(SHORT_ID_LEN);
        id
    }

    fn long_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Hands out identifiers that appear nowhere in a document snapshot and
/// were not handed out earlier by the same allocator.
///
/// One allocator spans one batch. The snapshot cannot see identifiers that
/// are issued but not yet written, so the allocator remembers them itself.
#[derive(Debug)]
pub struct IdAllocator<'a, S = UuidSource> {
    text: &'a str,
    issued: HashSet<String>,
    source: S,
}

impl<'a> IdAllocator<'a, UuidSource> {
    pub fn new(text: &'a str) -> Self {
        Self::with_source(text, UuidSource)
    }
}

impl<'a, S: IdSource> IdAllocator<'a, S> {
    pub fn with_source(text: &'a str, source: S) -> Self {
        Self {
            text,
            issued: HashSet::new(),
            source,
        }
    }

    /// Allocate the next unique identifier
    pub fn allocate(&mut self) -> String {
        let mut candidate = self.source.short_id();
        while self.is_taken(&candidate) {
            log::debug!("identifier {candidate:?} already in use, retrying with a long id");
            candidate = self.source.long_id();
        }
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Substring check against the snapshot, plus this batch's own ids
    pub fn is_taken(&self, candidate: &str) -> bool {
        self.issued.contains(candidate) || self.text.contains(candidate)
    }

    /// Number of identifiers issued so far
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

/// Generate one identifier unique against `text`
pub fn generate_unique_id(text: &str) -> String {
    IdAllocator::new(text).allocate()
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_uuid_source_lengths() {
        let mut source = UuidSource;
        let short = source.short_id();
        let long = source.long_id();

        assert_eq!(short.len(), SHORT_ID_LEN);
        assert_eq!(long.len(), 32);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(long.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_allocate_accepts_unused_candidate() {
        let source = ScriptedSource::new(&["abc123"], &[]);
        let mut ids = IdAllocator::with_source("| - [ ] |", source);

        assert_eq!(ids.allocate(), "abc123");
        assert_eq!(ids.issued_count(), 1);
    }

    #[test]
    fn test_allocate_retries_with_long_id_on_document_collision() {
        let text = r#"<input type="checkbox" unchecked id="abc123">"#;
        let source = ScriptedSource::new(&["abc123"], &["0123456789abcdef0123456789abcdef"]);
        let mut ids = IdAllocator::with_source(text, source);

        assert_eq!(ids.allocate(), "0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn test_allocate_never_repeats_within_batch() {
        // The document cannot see ids that were issued but not yet written
        let source = ScriptedSource::new(&["aaaaaa", "aaaaaa", "bbbbbb"], &["cccccc"]);
        let mut ids = IdAllocator::with_source("no ids here", source);

        let first = ids.allocate();
        let second = ids.allocate();
        let third = ids.allocate();

        assert_eq!(first, "aaaaaa");
        assert_eq!(second, "cccccc");
        assert_eq!(third, "bbbbbb");
    }

    #[test]
    fn test_substring_match_counts_as_taken() {
        // Known false positive: an id buried inside unrelated text is treated as used
        let ids = IdAllocator::with_source("see https://example.com/abc123def", UuidSource);
        assert!(ids.is_taken("abc123"));
        assert!(!ids.is_taken("fed321"));
    }

    #[test]
    fn test_generate_unique_id_avoids_existing_text() {
        let text = "some document";
        let id = generate_unique_id(text);

        assert!(!text.contains(&id));
        assert_eq!(id.len(), SHORT_ID_LEN);
    }
}
