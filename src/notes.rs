use once_cell::sync::Lazy;
use regex::Regex;

// @module: Splitting Markdown files and note dumps into units of work

/// Level-2 heading marker used for section splitting
pub const SECTION_HEADING: &str = "## ";

/// Default separator between notes in a notes dump
pub const DEFAULT_NOTE_DELIMITER: &str = "%%%";

/// Characters trimmed from both ends of every note
const NOTE_TRIM_CHARS: &[char] = &['\\', '-', ' ', '\n', '\t'];

static SECTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?m)^{}", regex::escape(SECTION_HEADING))).expect("Invalid section regex")
});

/// Split Markdown at lines starting with `heading`, keeping the marker on each section.
///
/// Text before the first heading becomes its own section when non-empty.
pub fn split_sections(content: &str, heading: &str) -> Vec<String> {
    let custom;
    let regex = if heading == SECTION_HEADING {
        &*SECTION_REGEX
    } else {
        custom = match Regex::new(&format!("(?m)^{}", regex::escape(heading))) {
            Ok(regex) => regex,
            Err(_) => return vec![content.to_string()],
        };
        &custom
    };

    let mut starts: Vec<usize> = regex.find_iter(content).map(|m| m.start()).collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(content.len());
            &content[start..end]
        })
        .filter(|section| !section.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a notes dump on a literal `delimiter`.
///
/// Em spaces become newlines, each note is trimmed of backslashes, dashes,
/// spaces, newlines and tabs, and blank notes are dropped.
pub fn split_notes(content: &str, delimiter: &str) -> Vec<String> {
    let normalized = content.replace('\u{2003}', "\n");

    normalized
        .split(delimiter)
        .filter(|note| !note.trim().is_empty())
        .map(|note| note.trim_matches(NOTE_TRIM_CHARS).to_string())
        .filter(|note| !note.is_empty())
        .collect()
}
