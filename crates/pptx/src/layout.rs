//! Page geometry, fixed styling constants, and the positioned-box model.

use serde::{Deserialize, Serialize};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Convert inches to EMU, truncating like the usual OOXML length helpers.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64) as i64
}

/// Fixed layout and styling used for every page.
///
/// Lengths are in inches, font sizes in points, colours as `RRGGBB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub slide_width: f64,
    pub slide_height: f64,

    /// Left edge shared by every box.
    pub left: f64,
    /// Width shared by every box.
    pub content_width: f64,

    pub title_top: f64,
    pub title_height: f64,
    pub title_font_size: f64,
    pub title_color: String,

    /// Where the vertical cursor starts, below the title region.
    pub content_top: f64,

    pub body_line_height: f64,
    pub body_max_height: f64,
    pub body_gap: f64,
    pub body_font_size: f64,
    pub body_color: String,

    pub code_line_height: f64,
    /// Extra height added to every code box.
    pub code_padding: f64,
    /// Height clamp for code interleaved with body text.
    pub code_max_height: f64,
    /// Height clamp for code on slides without body text.
    pub code_only_max_height: f64,
    pub code_gap: f64,
    pub code_font: String,
    pub code_font_size: f64,
    pub code_color: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_width: 13.333,
            slide_height: 7.5,
            left: 0.5,
            content_width: 12.3,
            title_top: 0.4,
            title_height: 0.8,
            title_font_size: 32.0,
            title_color: "1A1A2E".to_string(),
            content_top: 1.4,
            body_line_height: 0.3,
            body_max_height: 2.5,
            body_gap: 0.1,
            body_font_size: 14.0,
            body_color: "333333".to_string(),
            code_line_height: 0.22,
            code_padding: 0.3,
            code_max_height: 4.5,
            code_only_max_height: 5.0,
            code_gap: 0.15,
            code_font: "Courier New".to_string(),
            code_font_size: 10.0,
            code_color: "2D2D2D".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Create a config with the standard 16:9 widescreen layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different page size, in inches.
    pub fn with_slide_size(mut self, width: f64, height: f64) -> Self {
        self.slide_width = width;
        self.slide_height = height;
        self
    }

    /// Use a different monospace typeface for code boxes.
    pub fn with_code_font(mut self, font: impl Into<String>) -> Self {
        self.code_font = font.into();
        self
    }

    /// Page width in EMU.
    pub fn slide_width_emu(&self) -> i64 {
        inches(self.slide_width)
    }

    /// Page height in EMU.
    pub fn slide_height_emu(&self) -> i64 {
        inches(self.slide_height)
    }
}

/// What a text box holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Title,
    Body,
    Code,
}

/// Character formatting applied to every paragraph of a box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Size in points.
    pub font_size: f64,
    pub bold: bool,
    /// `RRGGBB`
    pub color: String,
    /// Latin typeface; `None` inherits the theme font.
    pub typeface: Option<String>,
}

/// A positioned, word-wrapped text box. Geometry is in EMU.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub kind: BoxKind,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    /// One entry per paragraph.
    pub paragraphs: Vec<String>,
    pub style: TextStyle,
}

impl TextBox {
    /// Bottom edge in EMU.
    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }
}

/// Everything placed on one page, in z-order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub boxes: Vec<TextBox>,
}

impl PageLayout {
    /// Boxes of one kind, in placement order.
    pub fn boxes_of(&self, kind: BoxKind) -> impl Iterator<Item = &TextBox> {
        self.boxes.iter().filter(move |b| b.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_truncates() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(7.5), 6_858_000);
        assert_eq!(inches(13.333), 12_191_695);
    }

    #[test]
    fn test_default_page_size() {
        let config = LayoutConfig::new();
        assert_eq!(config.slide_width_emu(), 12_191_695);
        assert_eq!(config.slide_height_emu(), 6_858_000);
    }

    #[test]
    fn test_builders() {
        let config = LayoutConfig::new()
            .with_slide_size(10.0, 7.5)
            .with_code_font("Fira Code");
        assert_eq!(config.slide_width_emu(), 9_144_000);
        assert_eq!(config.code_font, "Fira Code");
    }
}
