//! Slidev Markdown parser.
//!
//! Splits a deck into slide units, lifts code fences out of each body,
//! extracts the title and hands the rest to the [`MarkupStripper`].

use crate::markup::{MarkupStripper, BULLET};
use crate::types::{CodeBlock, Slide, CODE_BLOCK_PLACEHOLDER};
use crate::Result;
use regex::{NoExpand, Regex};
use std::path::Path;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching a slide separator, with an optional per-slide
/// `layout:`/`class:` metadata block after it.
static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n---\n(?:layout:.*?\n(?:class:.*?\n)?---\n)?|\n---\n").unwrap()
});

/// Regex matching the `title:` key of the front matter.
static FRONT_MATTER_TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^title:\s*(.+)$").unwrap());

/// Regex matching leftover `layout:`/`class:` metadata lines.
static METADATA_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:layout|class):.*$").unwrap());

/// Regex matching a fenced code block and capturing its language and body.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w*)\s*\n(.*?)```").unwrap());

/// Regex matching a level-1 heading and capturing its text.
static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

/// Regex matching a whole level-1 heading line.
static TITLE_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+.+$").unwrap());

/// Regex matching a level-2 heading prefix.
static H2_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s+").unwrap());

/// Regex matching a level-3 heading prefix.
static H3_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^###\s+").unwrap());

/// Sub-bullet used for level-3 headings.
const SUB_BULLET: &str = "  ◦ ";

/// Front matter must name its theme within this many characters.
const THEME_KEY_WINDOW: usize = 200;

/// Front matter must name its highlighter within this many characters.
const HIGHLIGHTER_KEY_WINDOW: usize = 500;

/// Parser for Slidev-flavoured Markdown decks.
#[derive(Debug, Clone)]
pub struct DeckParser {
    /// Whether to bring slide text (not code) to Unicode NFC.
    normalize_unicode: bool,
    stripper: MarkupStripper,
}

impl Default for DeckParser {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            stripper: MarkupStripper::new(),
        }
    }
}

impl DeckParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to normalize titles and body text to Unicode NFC.
    ///
    /// Code block contents are always kept byte for byte.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Read and parse a deck from disk.
    ///
    /// A missing or unreadable file is the only failure.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Slide>> {
        let path = path.as_ref();
        log::debug!("Reading deck from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(self.parse(&content))
    }

    /// Parse a deck into slides, in document order.
    ///
    /// Malformed input never fails; it degrades into miscleaned text.
    pub fn parse(&self, content: &str) -> Vec<Slide> {
        let source = self.prepare_source(content);
        let mut slides = Vec::new();
        let mut seen_content = false;

        for (idx, unit) in SEPARATOR_REGEX.split(&source).enumerate() {
            if unit.trim().is_empty() {
                continue;
            }

            let is_first = !seen_content;
            seen_content = true;

            if is_first && is_front_matter(unit) {
                match front_matter_title(unit).map(|title| self.normalize(&title)) {
                    Some(title) => {
                        log::debug!("Unit {}: front matter titled {:?}", idx, title);
                        slides.push(Slide::title_only(title));
                    }
                    None => log::debug!("Unit {}: front matter without a title, skipped", idx),
                }
                continue;
            }

            let slide = self.parse_unit(unit);
            if slide.is_empty() {
                log::debug!("Unit {}: nothing left after cleanup, dropped", idx);
                continue;
            }

            log::debug!(
                "Unit {}: title {:?}, {} code block(s)",
                idx,
                slide.title,
                slide.code_blocks.len()
            );
            slides.push(slide);
        }

        slides
    }

    /// Turn one slide unit into a [`Slide`].
    fn parse_unit(&self, unit: &str) -> Slide {
        let unit = METADATA_LINE_REGEX.replace_all(unit, "");

        let code_blocks = extract_code_blocks(&unit);
        let body = CODE_FENCE_REGEX.replace_all(&unit, NoExpand(CODE_BLOCK_PLACEHOLDER));
        if unit.matches("```").count() > code_blocks.len() * 2 {
            log::warn!("Unbalanced code fence left in slide body");
        }
        let body = self.normalize(&body);

        let title = TITLE_REGEX
            .captures(&body)
            .map(|caps| caps[1].trim().to_string())
            .filter(|title| !title.is_empty());

        let body = TITLE_LINE_REGEX.replace_all(&body, "");
        let body = H2_REGEX.replace_all(&body, BULLET);
        let body = H3_REGEX.replace_all(&body, SUB_BULLET);
        let body = self.stripper.strip(&body);

        Slide {
            title,
            body,
            code_blocks,
        }
    }

    /// Normalize line endings.
    fn prepare_source(&self, content: &str) -> String {
        content.replace("\r\n", "\n").replace('\r', "\n")
    }

    /// Compose slide text to NFC when enabled.
    fn normalize(&self, text: &str) -> String {
        if self.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        }
    }
}

/// Whether a unit is the deck's front matter.
fn is_front_matter(unit: &str) -> bool {
    char_prefix(unit, THEME_KEY_WINDOW).contains("theme:")
        && char_prefix(unit, HIGHLIGHTER_KEY_WINDOW).contains("highlighter:")
}

/// Extract the `title:` value from a front matter unit.
fn front_matter_title(unit: &str) -> Option<String> {
    FRONT_MATTER_TITLE_REGEX
        .captures(unit)
        .map(|caps| caps[1].trim().to_string())
}

/// Collect fenced code blocks in source order.
fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    CODE_FENCE_REGEX
        .captures_iter(text)
        .map(|caps| CodeBlock::new(&caps[1], caps[2].trim()))
        .collect()
}

/// The first `n` characters of `s`.
fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((pos, _)) => &s[..pos],
        None => s,
    }
}
