//! pdfsection CLI - section-tagged PDF content extraction

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsection::{
    assemble, render, ClassifierConfig, Document, JsonFormat, ParseOptions, PdfSource,
    PreparedSource,
};

#[derive(Parser)]
#[command(name = "pdfsection")]
#[command(version)]
#[command(about = "Extract section-tagged paragraphs, tables and charts from PDF to JSON", long_about = None)]
struct Cli {
    /// Input PDF file (or element JSON with --elements)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output JSON file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Skip pages whose text cannot be read instead of failing
    #[arg(long)]
    lenient: bool,

    /// Process pages on a single thread
    #[arg(long)]
    sequential: bool,

    /// Do not detect tables
    #[arg(long)]
    no_tables: bool,

    /// Do not emit image/chart placeholders
    #[arg(long)]
    no_images: bool,

    /// Bold text larger than this starts a section
    #[arg(long, value_name = "PT", env = "PDFSECTION_HEADING_SIZE", default_value_t = 14.0)]
    heading_size: f32,

    /// Bold text larger than this starts a sub-section
    #[arg(long, value_name = "PT", env = "PDFSECTION_SUBHEADING_SIZE", default_value_t = 11.5)]
    subheading_size: f32,

    /// Bold lines with fewer words than this start a sub-section
    #[arg(long, value_name = "N", env = "PDFSECTION_HEADING_WORDS", default_value_t = 10)]
    heading_words: usize,

    /// Treat INPUT as prepared element JSON instead of a PDF
    #[arg(long)]
    elements: bool,

    /// Verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_error_mode(if self.lenient {
                pdfsection::ErrorMode::Lenient
            } else {
                pdfsection::ErrorMode::Strict
            })
            .with_parallel(!self.sequential)
            .with_tables(!self.no_tables)
            .with_images(!self.no_images)
            .with_classifier(
                ClassifierConfig::new()
                    .with_heading_font_size(self.heading_size)
                    .with_subheading_font_size(self.subheading_size)
                    .with_heading_word_count(self.heading_words),
            )
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pb = spinner();
    pb.set_message(format!("Reading {}...", cli.input.display()));

    let doc = extract(&cli.input, cli.elements, cli.parse_options());
    let doc = match doc {
        Ok(doc) => doc,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    pb.set_message("Writing JSON...");
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = render::to_json(&doc, format)?;
    fs::write(&cli.output, json)?;
    pb.finish_and_clear();

    let items = doc.items().count();
    let tables = doc.items().filter(|i| i.is_table()).count();
    let charts = doc.items().filter(|i| i.is_chart()).count();
    println!(
        "{} {} ({} pages, {} items: {} tables, {} charts)",
        "Saved to".green(),
        cli.output.display(),
        doc.page_count(),
        items,
        tables,
        charts
    );

    Ok(())
}

fn extract(input: &Path, elements: bool, options: ParseOptions) -> pdfsection::Result<Document> {
    if elements {
        let source = PreparedSource::open(input)?;
        assemble(&source, options)
    } else {
        let source = PdfSource::open(input)?.with_options(&options);
        assemble(&source, options)
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "pdfsection",
            "in.pdf",
            "out.json",
            "--lenient",
            "--sequential",
            "--no-tables",
            "--heading-size",
            "18",
            "--heading-words",
            "6",
        ])
        .unwrap();
        let options = cli.parse_options();

        assert_eq!(options.error_mode, pdfsection::ErrorMode::Lenient);
        assert!(!options.parallel);
        assert!(!options.extract_tables);
        assert!(options.extract_images);
        assert_eq!(options.classifier.heading_font_size, 18.0);
        assert_eq!(options.classifier.subheading_font_size, 11.5);
        assert_eq!(options.classifier.heading_word_count, 6);
    }

    #[test]
    fn test_requires_output() {
        assert!(Cli::try_parse_from(["pdfsection", "in.pdf"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["pdfsection", "a", "b", "-v", "-q"]).is_err());
        let cli = Cli::try_parse_from(["pdfsection", "a", "b", "-q"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_elements_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("elements.json");
        fs::write(
            &input,
            r#"{"pages": [{"images": [{"bbox": [0, 0, 10, 10], "index": 1}]}]}"#,
        )
        .unwrap();

        let doc = extract(&input, true, ParseOptions::new()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].content[0].is_chart());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        assert!(extract(&missing, false, ParseOptions::new()).is_err());
    }
}
