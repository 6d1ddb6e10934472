/*!
 * Segmentation properties over a range of documents and lengths
 */

use notemend::correction::{split_long_text, Segmenter};
use crate::common;

fn documents() -> Vec<String> {
    vec![
        String::new(),
        "短句。".to_string(),
        "A。B。C。D。E。".repeat(5),
        common::sample_note(40),
        "没有句号的一整段很长的文字".repeat(6),
        format!("{}\n\n![图](images/x.png)\n{}", common::sample_note(8), common::sample_note(3)),
        "mixed ascii and 中文。 with spaces。 ".repeat(10),
    ]
}

#[test]
fn test_everySegment_shouldRespectMaxLength() {
    for document in documents() {
        for max_length in [1, 2, 3, 7, 10, 25, 100] {
            let segments: Vec<_> = Segmenter::new(&document, max_length).collect();
            for segment in &segments {
                assert!(
                    segment.char_len() <= max_length,
                    "segment {} of {:?} exceeds {}",
                    segment.index,
                    segment.text,
                    max_length
                );
            }
        }
    }
}

#[test]
fn test_segments_shouldReconstructDocumentWithoutWhitespaceBetween() {
    for document in documents() {
        for max_length in [3, 10, 25] {
            let joined: String = split_long_text(&document, max_length).concat();
            let expected: String = document.chars().filter(|c| !c.is_whitespace()).collect();
            let actual: String = joined.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(actual, expected, "max_length {}", max_length);
        }
    }
}

#[test]
fn test_exactLength_shouldYieldSingleSegment() {
    let document = "一二三四五六七八九十";
    let segments = split_long_text(document, 10);
    assert_eq!(segments, vec![document.to_string()]);
}

#[test]
fn test_terminatorEveryTwoChars_shouldCutOnTerminators() {
    let document = "A。B。C。D。E。".repeat(3);
    let segments: Vec<_> = Segmenter::new(&document, 10).collect();

    assert!(segments.len() > 1);
    for segment in &segments {
        assert!(segment.text.ends_with('。'), "{:?}", segment.text);
        assert!(!segment.forced);
    }
    let joined: String = segments.iter().map(|s| s.text).collect();
    assert_eq!(joined, document);
}

#[test]
fn test_indices_shouldBeOneBasedAndContiguous() {
    let document = common::sample_note(12);
    let indices: Vec<usize> = Segmenter::new(&document, 20).map(|s| s.index).collect();
    let expected: Vec<usize> = (1..=indices.len()).collect();
    assert_eq!(indices, expected);
}

#[test]
fn test_customTerminator_shouldBeHonored() {
    let segments: Vec<_> = Segmenter::new("one. two. three.", 10)
        .with_terminator('.')
        .map(|s| s.text)
        .collect();
    assert_eq!(segments, vec!["one. two.", "three."]);
}
