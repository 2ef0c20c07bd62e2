// ABOUTME: Main entry point for the pitch-deck program.
// ABOUTME: Provides CLI interface for serving the deck and exporting it to PDF.

use clap::{Args, Parser, Subcommand};
use log::info;
use pitch_deck::{Config, Deck, ExportOverrides, NavigationMode, Viewport};
use std::path::PathBuf;

/// Serve the pitch deck, or export a running one to PDF.
///
/// Without a subcommand, captures every slide of the running presentation and
/// assembles them into a PDF. Start the presentation first with `pitch-deck serve`.
#[derive(Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the presentation over HTTP
    Serve(ServeArgs),

    /// Build a PDF from screenshots kept by an earlier export
    Assemble(AssembleArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Keep screenshot files after PDF generation
    #[arg(long)]
    keep_screenshots: bool,

    /// Root address of the running presentation
    #[arg(long)]
    base_url: Option<String>,

    /// Staging directory for screenshots
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path of the generated PDF
    #[arg(long)]
    pdf_output: Option<PathBuf>,

    /// Viewport width in pixels (PDF page width in points)
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels (PDF page height in points)
    #[arg(long)]
    height: Option<u32>,

    /// Device scale factor of the screenshots
    #[arg(long)]
    scale: Option<f64>,

    /// Number of slides to capture, or "auto" to ask the presentation server
    #[arg(long)]
    slide_count: Option<String>,

    /// Settle time in milliseconds when a slide reports no finished animation
    #[arg(long)]
    delay: Option<u64>,

    /// How to reach each slide: direct or keyboard
    #[arg(long)]
    navigation: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    /// Markdown deck to serve instead of the built-in one
    #[arg(short, long)]
    deck: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[derive(Args)]
struct AssembleArgs {
    /// Directory holding the screenshots
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the generated PDF
    #[arg(short, long)]
    output: PathBuf,

    /// Glob pattern selecting the screenshots
    #[arg(long, default_value = "slide-*.png")]
    pattern: String,

    /// Page width in points
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Page height in points
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

impl ExportArgs {
    fn into_overrides(self) -> pitch_deck::Result<ExportOverrides> {
        let (slide_count, discover_slide_count) = match self.slide_count.as_deref() {
            None => (None, false),
            Some(raw) if raw.eq_ignore_ascii_case("auto") => (None, true),
            Some(raw) => {
                let count = raw.parse::<usize>().map_err(|_| {
                    pitch_deck::DeckError::ConfigError(format!("Invalid slide count: {}", raw))
                })?;
                (Some(count), false)
            }
        };

        let navigation = self
            .navigation
            .as_deref()
            .map(str::parse::<NavigationMode>)
            .transpose()?;

        Ok(ExportOverrides {
            base_url: self.base_url,
            output_dir: self.output_dir,
            pdf_output: self.pdf_output,
            width: self.width,
            height: self.height,
            scale: self.scale,
            slide_count,
            discover_slide_count,
            delay_ms: self.delay,
            navigation,
            keep_screenshots: self.keep_screenshots,
        })
    }
}

fn run(cli: Cli) -> pitch_deck::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => {
            let deck = match &args.deck {
                Some(path) => Deck::load(path)?,
                None => Deck::builtin()?,
            };
            pitch_deck::serve(deck, &format!("{}:{}", args.host, args.port))
        }
        Some(Commands::Assemble(args)) => {
            let viewport = Viewport {
                width: args.width,
                height: args.height,
                scale: 1.0,
            };
            let pages =
                pitch_deck::assemble_directory(&args.input, &args.pattern, &args.output, &viewport)?;
            println!("PDF created: {:?} ({} pages)", args.output, pages);
            Ok(())
        }
        None => {
            let config = Config::from_env()?.export_config(cli.export.into_overrides()?);
            info!("Exporting {} to {:?}", config.base_url, config.pdf_output);

            let report = pitch_deck::export_deck(&config)?;
            if !report.failed.is_empty() {
                println!(
                    "Warning: slides {:?} could not be captured and are missing from the PDF",
                    report.failed
                );
            }
            println!("PDF generation complete: {:?} ({} pages)", report.pdf_path, report.pages);
            if report.screenshots_kept {
                println!("Screenshots kept in {:?}", config.output_dir);
            }
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
