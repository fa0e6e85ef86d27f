//! CLI tool for converting Slidev Markdown into editable PowerPoint files.

use anyhow::{Context, Result};
use clap::Parser;
use slidev_core::DeckParser;
use slidev_pptx::PptxWriter;
use std::path::{Path, PathBuf};

/// Convert a Slidev Markdown deck into a PowerPoint file with editable text boxes.
#[derive(Parser, Debug)]
#[command(name = "slidev2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Slidev Markdown file
    #[arg(default_value = "slides.md")]
    input: PathBuf,

    /// Output PowerPoint file
    #[arg(default_value = "App_Presentation.pptx")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    println!(
        "Converting {} to {}...",
        args.input.display(),
        args.output.display()
    );

    let count = convert(&args.input, &args.output)?;

    println!(
        "✓ Created {} with {} editable slides",
        args.output.display(),
        count
    );

    Ok(())
}

/// Parse `input` and write the presentation to `output`.
fn convert(input: &Path, output: &Path) -> Result<usize> {
    let slides = DeckParser::new()
        .parse_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("Found {} slides", slides.len());

    PptxWriter::new()
        .save(&slides, output)
        .with_context(|| format!("Failed to write {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let args = Args::parse_from(["slidev2pptx"]);
        assert_eq!(args.input, PathBuf::from("slides.md"));
        assert_eq!(args.output, PathBuf::from("App_Presentation.pptx"));
        assert!(!args.verbose);
    }

    #[test]
    fn test_positional_paths() {
        let args = Args::parse_from(["slidev2pptx", "talk.md", "talk.pptx", "-v"]);
        assert_eq!(args.input, PathBuf::from("talk.md"));
        assert_eq!(args.output, PathBuf::from("talk.pptx"));
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_input_fails_without_output() {
        let dir = std::env::temp_dir();
        let input = dir.join("slidev2pptx-missing-input.md");
        let output = dir.join(format!("slidev2pptx-never-{}.pptx", std::process::id()));

        let err = convert(&input, &output).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_round_trip() {
        let dir = std::env::temp_dir();
        let id = std::process::id();
        let input = dir.join(format!("slidev2pptx-in-{}.md", id));
        let output = dir.join(format!("slidev2pptx-out-{}.pptx", id));
        std::fs::write(&input, "# One\n\nHello\n---\n# Two\n\n```js\nx()\n```").unwrap();

        let count = convert(&input, &output).unwrap();
        assert_eq!(count, 2);
        assert!(output.exists());

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
    }
}
