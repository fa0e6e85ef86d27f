//! PPTX (Office Open XML) renderer backend for Markdown to PowerPoint conversion.
//!
//! Lays parsed slides out as pages of positioned text boxes and writes them
//! as a .pptx package (a ZIP archive of XML parts).

pub mod layout;
pub mod renderer;
pub mod template;
pub mod writer;
mod xml;

pub use layout::{BoxKind, LayoutConfig, PageLayout, TextBox, TextStyle};
pub use renderer::SlideRenderer;
pub use writer::PptxWriter;
