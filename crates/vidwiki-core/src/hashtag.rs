//! Hashtag extraction and merge.
//!
//! Generated articles arrive as one block of text with hashtags mixed in.
//! [`extract`] splits that text into a body and an ordered tag list, and
//! [`merge`] recombines the two into the canonical document that gets
//! persisted. For any body without hashtags, `extract(merge(b, t))` yields
//! `(b, t)` again, byte for byte.
//!
//! Every `#word` token is removed from the body wherever it appears,
//! including mid-sentence uses of `#` that were not meant as hashtags. Only
//! lines that held a token are touched; every other line is kept verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `#` followed by one or more Unicode word characters.
static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"));

/// Separator placed between tags when they are joined for display.
pub const TAG_SEPARATOR: &str = ", ";

/// Separator placed between the body and the tags in a canonical document.
pub const BODY_TAG_SEPARATOR: &str = "\n\n";

/// The result of splitting generated text into body and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Text with every hashtag token removed.
    pub body: String,
    /// Hashtags in order of first appearance, joined with [`TAG_SEPARATOR`].
    pub tags: String,
}

impl ExtractedText {
    /// Recombines body and tags into a canonical document.
    pub fn merged(&self) -> String {
        merge(&self.body, &self.tags)
    }
}

/// Splits `raw` into a body without hashtags and the comma-joined hashtags.
///
/// On a line that held tokens, horizontal whitespace left behind by a
/// removed token is collapsed and the line end is trimmed; if nothing but
/// tag separators remain, the line is dropped. A trailing tag block is
/// removed together with the line break that set it off from the body.
pub fn extract(raw: &str) -> ExtractedText {
    let mut tags: Vec<&str> = Vec::new();
    let mut body = String::with_capacity(raw.len());
    // Body length before the first dropped line of a trailing tag block.
    let mut tail_cut: Option<usize> = None;

    for line in raw.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        match remove_tokens(content, &mut tags) {
            None => {
                if !content.trim().is_empty() {
                    tail_cut = None;
                }
                body.push_str(line);
            }
            Some(rest) if is_separator_residue(&rest) => {
                tail_cut.get_or_insert(body.len());
            }
            Some(rest) => {
                tail_cut = None;
                body.push_str(&rest);
                if line.ends_with('\n') {
                    body.push('\n');
                }
            }
        }
    }

    if let Some(cut) = tail_cut {
        body.truncate(cut);
        let separator_len = if body.ends_with(BODY_TAG_SEPARATOR) {
            BODY_TAG_SEPARATOR.len()
        } else if body.ends_with('\n') {
            1
        } else {
            0
        };
        body.truncate(body.len() - separator_len);
    }

    ExtractedText {
        body,
        tags: tags.join(TAG_SEPARATOR),
    }
}

/// Joins a body and a tag list into one canonical document.
///
/// The tags follow the body after a blank line. Empty tags leave the body
/// untouched; an empty body yields just the tags.
pub fn merge(body: &str, tags: &str) -> String {
    let tags = tags.trim();

    if tags.is_empty() {
        body.to_string()
    } else if body.is_empty() {
        tags.to_string()
    } else {
        format!("{body}{BODY_TAG_SEPARATOR}{tags}")
    }
}

/// Brings a hand-edited tag list into canonical form.
///
/// Entries may be separated by commas or whitespace and may omit the leading
/// `#`. Entries that do not form a hashtag are dropped, as are duplicates.
pub fn normalize_tags(input: &str) -> String {
    let mut tags: Vec<String> = Vec::new();

    for entry in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let candidate = if entry.starts_with('#') {
            entry.to_string()
        } else {
            format!("#{entry}")
        };
        let is_whole_tag = HASHTAG_PATTERN
            .find(&candidate)
            .is_some_and(|m| m.start() == 0 && m.end() == candidate.len());
        if is_whole_tag && !tags.contains(&candidate) {
            tags.push(candidate);
        }
    }

    tags.join(TAG_SEPARATOR)
}

/// Removes the tokens from one line, recording new tags in order.
///
/// Returns `None` when the line holds no token.
fn remove_tokens<'a>(line: &'a str, tags: &mut Vec<&'a str>) -> Option<String> {
    let mut stripped = String::with_capacity(line.len());
    let mut cursor = 0;
    let mut found = false;

    for token in HASHTAG_PATTERN.find_iter(line) {
        found = true;
        if !tags.contains(&token.as_str()) {
            tags.push(token.as_str());
        }

        stripped.push_str(&line[cursor..token.start()]);
        cursor = token.end();

        if stripped.is_empty() || stripped.ends_with([' ', '\t']) {
            let rest = &line[cursor..];
            let kept = rest.trim_start_matches([' ', '\t']);
            cursor += rest.len() - kept.len();
        }
    }

    if !found {
        return None;
    }
    stripped.push_str(&line[cursor..]);
    Some(stripped.trim_end().to_string())
}

/// What a tag line turns into once its tokens are gone: nothing but
/// commas and whitespace.
fn is_separator_residue(line: &str) -> bool {
    line.chars().all(|c| c == ',' || c.is_whitespace())
}
