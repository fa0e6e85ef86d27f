//! Core slide types, Slidev Markdown parsing, and markup cleanup
//! for Markdown to PowerPoint conversion.

pub mod error;
pub mod markup;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use markup::MarkupStripper;
pub use parser::DeckParser;
pub use types::{CodeBlock, Slide, CODE_BLOCK_PLACEHOLDER, DEFAULT_LANGUAGE};
