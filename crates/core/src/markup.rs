//! Markup stripping for Slidev slide bodies.
//!
//! Removes the Vue/Slidev directives and HTML wrappers that have no meaning
//! in a plain text box, unwraps Markdown emphasis, collapses blank lines and
//! turns `-` list markers into bullet glyphs.

use regex::Regex;
use std::sync::LazyLock;

/// Bullet glyph used for list items and level-2 headings.
pub const BULLET: &str = "• ";

/// A single regex substitution applied to the whole body.
struct Pass {
    pattern: Regex,
    replacement: &'static str,
}

impl Pass {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            replacement,
        }
    }
}

/// Slidev/Vue/HTML cleanup, in application order.
static DIRECTIVE_PASSES: LazyLock<Vec<Pass>> = LazyLock::new(|| {
    vec![
        Pass::new(r"<v-clicks?>|</v-clicks?>", ""),
        Pass::new(r"<div[^>]*>", ""),
        Pass::new(r"</div>", ""),
        Pass::new(r"<span[^>]*>|</span>", ""),
        // Links keep their text.
        Pass::new(r"<a[^>]*>([^<]*)</a>", "$1"),
        Pass::new(r"<strong[^>]*>|</strong>", ""),
        Pass::new(r"<code[^>]*>|</code>", ""),
        Pass::new(r"<br\s*/?>", "\n"),
        Pass::new(r"(?s)<style>.*?</style>", ""),
        Pass::new(r#"v-click="?\d*"?"#, ""),
        Pass::new(r#"@click="[^"]*""#, ""),
        Pass::new(r#"hover="[^"]*""#, ""),
        // Vue bindings such as {scale: 0.6}
        Pass::new(r"\{[^}]*\}", ""),
        Pass::new(r#"class="[^"]*""#, ""),
    ]
});

/// Markdown emphasis and inline code, unwrapped to plain text.
static EMPHASIS_PASSES: LazyLock<Vec<Pass>> = LazyLock::new(|| {
    vec![
        Pass::new(r"\*\*([^*]+)\*\*", "$1"),
        Pass::new(r"\*([^*]+)\*", "$1"),
        Pass::new(r"`([^`]+)`", "$1"),
    ]
});

/// Regex matching three or more consecutive newlines.
static BLANK_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Regex matching a `-` list marker at the start of a line.
static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^-\s+").unwrap());

/// Strips framework markup and Markdown decoration from slide bodies.
#[derive(Debug, Clone, Default)]
pub struct MarkupStripper;

impl MarkupStripper {
    /// Create a new stripper.
    pub fn new() -> Self {
        Self
    }

    /// Run every cleanup pass over `text`.
    ///
    /// Never fails: unbalanced tags or stray directive syntax simply survive
    /// into the output. Running it again on its own output changes nothing
    /// for ordinary slide text.
    pub fn strip(&self, text: &str) -> String {
        let mut body = self.strip_directives(text);
        body = self.strip_emphasis(&body);
        body = self.collapse_blank_lines(&body);
        self.convert_list_markers(body.trim())
    }

    /// Remove Slidev/Vue directives and HTML wrapper tags.
    pub fn strip_directives(&self, text: &str) -> String {
        apply_passes(&DIRECTIVE_PASSES, text)
    }

    /// Unwrap `**bold**`, `*italic*` and `` `code` `` spans.
    ///
    /// Repeats until nothing changes, so nested spans such as
    /// `**a *b* c**` unwrap completely. Every round removes delimiters.
    pub fn strip_emphasis(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let next = apply_passes(&EMPHASIS_PASSES, &current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Collapse runs of blank lines to a single blank line.
    pub fn collapse_blank_lines(&self, text: &str) -> String {
        BLANK_RUN_REGEX.replace_all(text, "\n\n").into_owned()
    }

    /// Turn leading `- ` list markers into bullet glyphs.
    pub fn convert_list_markers(&self, text: &str) -> String {
        LIST_MARKER_REGEX.replace_all(text, BULLET).into_owned()
    }
}

fn apply_passes(passes: &[Pass], text: &str) -> String {
    let mut result = text.to_string();
    for pass in passes {
        if pass.pattern.is_match(&result) {
            result = pass
                .pattern
                .replace_all(&result, pass.replacement)
                .into_owned();
        }
    }
    result
}
