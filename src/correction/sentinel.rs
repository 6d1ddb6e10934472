/*!
 * Sentinel tags around a segment.
 *
 * Segments travel to the model as `<note>…</note>`. Replies may come back in
 * the same wrapper, which is removed only when both tags frame the reply.
 */

/// Outcome of matching a reply against the sentinel pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggedContent<'a> {
    /// Opening tag at the start and closing tag at the end; holds the inner text
    Matched(&'a str),
    /// Neither tag frames the text
    Unmatched(&'a str),
    /// Only one of the two tags frames the text
    Malformed(&'a str),
}

impl<'a> TaggedContent<'a> {
    /// The usable text: inner content when matched, the input otherwise
    pub fn into_text(self) -> &'a str {
        match self {
            TaggedContent::Matched(text)
            | TaggedContent::Unmatched(text)
            | TaggedContent::Malformed(text) => text,
        }
    }
}

/// An opening/closing tag pair such as `<note>` / `</note>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelTags {
    open: String,
    close: String,
}

impl Default for SentinelTags {
    fn default() -> Self {
        Self::new("note")
    }
}

impl SentinelTags {
    /// Tag pair for an XML-like element name
    pub fn new(name: &str) -> Self {
        Self {
            open: format!("<{}>", name),
            close: format!("</{}>", name),
        }
    }

    /// Opening tag
    pub fn open(&self) -> &str {
        &self.open
    }

    /// Closing tag
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Wrap text in the tag pair
    pub fn wrap(&self, text: &str) -> String {
        let mut wrapped = String::with_capacity(self.open.len() + text.len() + self.close.len());
        wrapped.push_str(&self.open);
        wrapped.push_str(text);
        wrapped.push_str(&self.close);
        wrapped
    }

    /// Classify a reply
    pub fn parse<'a>(&self, text: &'a str) -> TaggedContent<'a> {
        let opens = text.starts_with(&self.open);
        let closes = text.ends_with(&self.close);

        match (opens, closes) {
            (true, true) if text.len() >= self.open.len() + self.close.len() => {
                TaggedContent::Matched(&text[self.open.len()..text.len() - self.close.len()])
            }
            (false, false) => TaggedContent::Unmatched(text),
            _ => TaggedContent::Malformed(text),
        }
    }

    /// Inner text when the reply is framed by both tags, the reply otherwise
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        self.parse(text).into_text()
    }
}
