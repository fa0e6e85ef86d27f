//! Page layout for parsed slides.
//!
//! Places a title box at a fixed offset, then walks a vertical cursor down
//! the page, alternating body text segments with the code blocks that were
//! lifted out of them. There is no overflow handling: a tall slide simply
//! runs past the bottom of the page.

use crate::layout::{inches, BoxKind, LayoutConfig, PageLayout, TextBox, TextStyle};
use slidev_core::{CodeBlock, Slide};

/// Lays out slides as pages of positioned text boxes.
#[derive(Debug, Clone, Default)]
pub struct SlideRenderer {
    config: LayoutConfig,
}

impl SlideRenderer {
    /// Create a renderer with the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with a custom layout.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The layout in use.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out every slide. Always returns one page per slide, in order.
    pub fn layout_all(&self, slides: &[Slide]) -> Vec<PageLayout> {
        slides.iter().map(|slide| self.layout(slide)).collect()
    }

    /// Lay out a single slide.
    pub fn layout(&self, slide: &Slide) -> PageLayout {
        let cfg = &self.config;
        let mut page = PageLayout::default();

        if let Some(title) = slide.title.as_deref().filter(|t| !t.is_empty()) {
            page.boxes.push(TextBox {
                kind: BoxKind::Title,
                x: inches(cfg.left),
                y: inches(cfg.title_top),
                width: inches(cfg.content_width),
                height: inches(cfg.title_height),
                paragraphs: vec![title.to_string()],
                style: TextStyle {
                    font_size: cfg.title_font_size,
                    bold: true,
                    color: cfg.title_color.clone(),
                    typeface: None,
                },
            });
        }

        let mut cursor = inches(cfg.content_top);

        if !slide.body.is_empty() {
            let mut pending = slide.code_blocks.iter();
            for segment in slide.body_segments() {
                let segment = segment.trim();
                if !segment.is_empty() {
                    let text_box = self.body_box(segment, cursor);
                    cursor += text_box.height + inches(cfg.body_gap);
                    page.boxes.push(text_box);
                }

                if let Some(block) = pending.next() {
                    let code_box = self.code_box(block, cursor, cfg.code_max_height);
                    cursor += code_box.height + inches(cfg.code_gap);
                    page.boxes.push(code_box);
                }
            }

            let unplaced = pending.count();
            if unplaced > 0 {
                log::warn!("{} code block(s) had no placeholder and were not placed", unplaced);
            }
        } else {
            for block in &slide.code_blocks {
                let code_box = self.code_box(block, cursor, cfg.code_only_max_height);
                cursor += code_box.height + inches(cfg.code_gap);
                page.boxes.push(code_box);
            }
        }

        if cursor > cfg.slide_height_emu() {
            log::debug!(
                "Slide {:?} overflows the page by {} EMU",
                slide.title,
                cursor - cfg.slide_height_emu()
            );
        }

        page
    }

    /// A body text box at `top`, one paragraph per line.
    fn body_box(&self, text: &str, top: i64) -> TextBox {
        let cfg = &self.config;
        let lines = text.matches('\n').count() + 1;
        let height = inches(cfg.body_line_height * lines as f64).min(inches(cfg.body_max_height));

        TextBox {
            kind: BoxKind::Body,
            x: inches(cfg.left),
            y: top,
            width: inches(cfg.content_width),
            height,
            paragraphs: text.split('\n').map(str::to_string).collect(),
            style: TextStyle {
                font_size: cfg.body_font_size,
                bold: false,
                color: cfg.body_color.clone(),
                typeface: None,
            },
        }
    }

    /// A code box at `top`, clamped to `max_height` inches.
    fn code_box(&self, block: &CodeBlock, top: i64, max_height: f64) -> TextBox {
        let cfg = &self.config;
        let lines = block.line_count();
        let height = inches(cfg.code_line_height * lines as f64 + cfg.code_padding)
            .min(inches(max_height));

        TextBox {
            kind: BoxKind::Code,
            x: inches(cfg.left),
            y: top,
            width: inches(cfg.content_width),
            height,
            paragraphs: block.display_lines(),
            style: TextStyle {
                font_size: cfg.code_font_size,
                bold: false,
                color: cfg.code_color.clone(),
                typeface: Some(cfg.code_font.clone()),
            },
        }
    }
}
