/*!
 * Sentence-aware splitting of long documents.
 *
 * A document longer than `max_length` characters is cut into segments that
 * end on the last sentence terminator inside each window. Lengths are counted
 * in characters, not bytes.
 */

use std::iter::FusedIterator;
use log::warn;

/// Full-width period, the sentence end of Chinese prose
pub const DEFAULT_TERMINATOR: char = '。';

/// One piece of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// 1-based position in the document
    pub index: usize,
    /// The segment text, borrowed from the document
    pub text: &'a str,
    /// True when no terminator was found and the cut fell mid-sentence
    pub forced: bool,
}

impl Segment<'_> {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Lazy iterator over the segments of a document
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    rest: &'a str,
    max_length: usize,
    terminator: char,
    emitted: usize,
}

impl<'a> Segmenter<'a> {
    /// Segment `document` into pieces of at most `max_length` characters.
    ///
    /// A `max_length` of zero is treated as one.
    pub fn new(document: &'a str, max_length: usize) -> Self {
        Self {
            rest: document,
            max_length: max_length.max(1),
            terminator: DEFAULT_TERMINATOR,
            emitted: 0,
        }
    }

    /// Use a different sentence terminator
    pub fn with_terminator(mut self, terminator: char) -> Self {
        self.terminator = terminator;
        self
    }

    /// Where the next segment ends (byte offset) and whether the cut is forced
    fn next_cut(&self) -> (usize, bool) {
        let Some((window_end, _)) = self.rest.char_indices().nth(self.max_length) else {
            // The remainder fits
            return (self.rest.len(), false);
        };

        match self.rest[..window_end].rfind(self.terminator) {
            Some(pos) => (pos + self.terminator.len_utf8(), false),
            None => (window_end, true),
        }
    }
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let (end, forced) = self.next_cut();
        self.emitted += 1;

        if forced {
            warn!(
                "No '{}' within {} characters, forcing a split in segment {}",
                self.terminator, self.max_length, self.emitted
            );
        }

        let text = &self.rest[..end];
        self.rest = self.rest[end..].trim_start();

        Some(Segment {
            index: self.emitted,
            text,
            forced,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.rest.is_empty() {
            (0, Some(0))
        } else {
            (1, Some(self.rest.len()))
        }
    }
}

impl FusedIterator for Segmenter<'_> {}

/// Split `text` into owned segments of at most `max_length` characters
pub fn split_long_text(text: &str, max_length: usize) -> Vec<String> {
    Segmenter::new(text, max_length)
        .map(|segment| segment.text.to_string())
        .collect()
}
