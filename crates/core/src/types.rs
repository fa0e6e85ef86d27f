//! Domain types for representing parsed slide content.

use serde::{Deserialize, Serialize};

/// Literal token substituted for each extracted code fence in a slide body.
///
/// The renderer splits the body on this token and places the matching
/// [`CodeBlock`] in each gap, so the i-th token pairs with the i-th block.
pub const CODE_BLOCK_PLACEHOLDER: &str = "[CODE_BLOCK]";

/// Language recorded for a fence without an info string.
pub const DEFAULT_LANGUAGE: &str = "text";

/// A single slide extracted from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Text of the first level-1 heading, if any.
    pub title: Option<String>,

    /// Cleaned body text. May contain [`CODE_BLOCK_PLACEHOLDER`] markers.
    pub body: String,

    /// Code fences in source order.
    pub code_blocks: Vec<CodeBlock>,
}

impl Slide {
    /// Create a slide carrying only a title.
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: String::new(),
            code_blocks: Vec::new(),
        }
    }

    /// Whether the slide has anything to render.
    ///
    /// Slides with an empty title, empty body and no code are dropped by the
    /// parser and never reach the renderer.
    pub fn is_empty(&self) -> bool {
        self.title.as_deref().map_or(true, str::is_empty)
            && self.body.is_empty()
            && self.code_blocks.is_empty()
    }

    /// Split the body into the text segments that surround code blocks.
    ///
    /// A body with `n` placeholders always yields `n + 1` segments; segments
    /// are returned untrimmed.
    pub fn body_segments(&self) -> Vec<&str> {
        self.body.split(CODE_BLOCK_PLACEHOLDER).collect()
    }
}

/// A fenced code block lifted out of a slide body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Info string of the fence, or [`DEFAULT_LANGUAGE`].
    pub language: String,

    /// Fence contents, trimmed.
    pub code: String,
}

impl CodeBlock {
    /// Create a code block, falling back to [`DEFAULT_LANGUAGE`] when the
    /// language is empty.
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        let language = language.into();
        Self {
            language: if language.is_empty() {
                DEFAULT_LANGUAGE.to_string()
            } else {
                language
            },
            code: code.into(),
        }
    }

    /// Label shown above the code, e.g. `[rust]`.
    ///
    /// Blocks without a real language get no label.
    pub fn header(&self) -> Option<String> {
        if self.language.is_empty() || self.language == DEFAULT_LANGUAGE {
            None
        } else {
            Some(format!("[{}]", self.language))
        }
    }

    /// Number of lines in the code itself, excluding the header.
    pub fn line_count(&self) -> usize {
        self.code.matches('\n').count() + 1
    }

    /// Lines to render: the header (if any) followed by the code lines.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.line_count() + 1);
        if let Some(header) = self.header() {
            lines.push(header);
        }
        lines.extend(self.code.split('\n').map(str::to_string));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_defaults_language() {
        let block = CodeBlock::new("", "echo hi");
        assert_eq!(block.language, "text");
        assert_eq!(block.header(), None);
    }

    #[test]
    fn test_code_block_display_lines() {
        let block = CodeBlock::new("ts", "const a = 1;\nconst b = 2;");
        assert_eq!(block.line_count(), 2);
        assert_eq!(
            block.display_lines(),
            vec!["[ts]", "const a = 1;", "const b = 2;"]
        );

        let plain = CodeBlock::new("text", "plain");
        assert_eq!(plain.display_lines(), vec!["plain"]);
    }

    #[test]
    fn test_body_segments() {
        let slide = Slide {
            title: None,
            body: "Intro\n[CODE_BLOCK]\nMiddle\n[CODE_BLOCK]".to_string(),
            code_blocks: vec![CodeBlock::new("js", "a"), CodeBlock::new("js", "b")],
        };
        assert_eq!(slide.body_segments(), vec!["Intro\n", "\nMiddle\n", ""]);
    }

    #[test]
    fn test_is_empty() {
        let empty = Slide {
            title: Some(String::new()),
            body: String::new(),
            code_blocks: Vec::new(),
        };
        assert!(empty.is_empty());
        assert!(!Slide::title_only("Demo").is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let slide = Slide::title_only("Demo");
        let json = serde_json::to_value(&slide).unwrap();
        assert_eq!(json["title"], "Demo");
        assert_eq!(json["body"], "");
        assert!(json["code_blocks"].as_array().unwrap().is_empty());
    }
}
