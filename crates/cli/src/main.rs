//! CLI tool for generating slide decks from a text prompt.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deckgen_core::{Config, OutputConfig};
use deckgen_pipeline::{download, ErrorResponse, PresentationService};
use deckgen_pptx::PptxParser;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Generate PowerPoint decks from a prompt using a language model.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Static-serving root (overrides DECKGEN_STATIC_DIR)
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck from a prompt and print the result as JSON
    Generate {
        /// What the deck should be about (at least 10 characters)
        prompt: String,

        /// Produce text-only slides
        #[arg(long)]
        no_images: bool,
    },

    /// Copy a generated deck out of the output directory
    Download {
        /// File name as returned by `generate`
        filename: String,

        /// Destination file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print slide count and titles of a .pptx file
    Inspect {
        /// Input .pptx file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env file loaded: {}", e);
    }

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    match &args.command {
        Command::Generate { prompt, no_images } => generate(args, prompt, !no_images),
        Command::Download { filename, output } => {
            let output_config = output_config(args);
            let bytes = download(&output_config, filename)
                .with_context(|| format!("Failed to download {}", filename))?;
            write_bytes(output.as_deref(), &bytes)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { input } => {
            inspect(input)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn generate(args: &Args, prompt: &str, include_images: bool) -> Result<ExitCode> {
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            print_error(&ErrorResponse::new("Configuration error", e.to_string()))?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Some(dir) = &args.static_dir {
        config.output = OutputConfig::with_static_root(dir);
    }

    let service = PresentationService::from_config(&config)
        .context("Failed to initialize presentation service")?;

    if args.verbose {
        eprintln!("Generating deck (images: {})", include_images);
    }

    match service.generate_response(prompt, include_images) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            print_error(&error)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn inspect(input: &Path) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let deck = PptxParser::new()
        .parse(BufReader::new(file))
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}: {} slides", input.display(), deck.slide_count());
    for slide in &deck.slides {
        let pictures = if slide.pictures > 0 {
            format!(" [{} image(s)]", slide.pictures)
        } else {
            String::new()
        };
        println!("  {:>2}. {}{}", slide.number, slide.title(), pictures);
    }
    Ok(())
}

/// Output layout for commands that need no credentials.
fn output_config(args: &Args) -> OutputConfig {
    match &args.static_dir {
        Some(dir) => OutputConfig::with_static_root(dir),
        None => std::env::var(deckgen_core::config::ENV_STATIC_DIR)
            .map(OutputConfig::with_static_root)
            .unwrap_or_default(),
    }
}

fn print_error(error: &ErrorResponse) -> Result<()> {
    eprintln!("{}", serde_json::to_string_pretty(error)?);
    Ok(())
}

fn write_bytes(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(bytes)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}
