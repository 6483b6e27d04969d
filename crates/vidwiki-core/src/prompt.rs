//! Prompt composition.
//!
//! The generation backend receives a single instruction blob. It is built
//! from two independently editable parts: what the article must contain and
//! how it should be presented.

use crate::session::DraftPrompt;

/// Label that opens the content section of a composed prompt.
pub const CONTENT_SECTION_LABEL: &str = "Content requirements:";

/// Label that opens the presentation section of a composed prompt.
pub const STYLE_SECTION_LABEL: &str = "Presentation requirements:";

/// Instruction used when the content intent is left blank.
pub const DEFAULT_CONTENT_INTENT: &str = "You are a YouTube SEO expert. Write a complete post \
    for this video consisting of a catchy title, a detailed description of about 500 words \
    and a list of hashtags.";

/// Presentation instruction offered for new sessions.
pub const DEFAULT_STYLE_INTENT: &str = "Write the post as one continuous Markdown text. \
    Do not prefix parts with labels such as 'Title:', 'Description:' or 'Hashtags:'.";

/// Builds one instruction string from a content intent and a style intent.
///
/// The content section always comes first. A blank content intent falls back
/// to [`DEFAULT_CONTENT_INTENT`]; a blank style intent omits the
/// presentation section. The same inputs always produce the same bytes.
pub fn compose(content_intent: &str, style_intent: Option<&str>) -> String {
    let content = match content_intent.trim() {
        "" => DEFAULT_CONTENT_INTENT,
        trimmed => trimmed,
    };

    let mut composed = format!("{CONTENT_SECTION_LABEL}\n{content}");

    if let Some(style) = style_intent.map(str::trim).filter(|s| !s.is_empty()) {
        composed.push_str("\n\n");
        composed.push_str(STYLE_SECTION_LABEL);
        composed.push('\n');
        composed.push_str(style);
    }

    composed
}

/// Composes the prompt for a draft.
pub fn compose_draft(draft: &DraftPrompt) -> String {
    compose(&draft.content_intent, draft.style_intent.as_deref())
}
