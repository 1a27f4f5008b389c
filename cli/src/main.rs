//! plaintext CLI - flat-text to LaTeX transcoder

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use plaintext::{
    Block, CleanupPreset, Diagnostic, FlatFile, JsonFormat, ParseOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "plaintext")]
#[command(author = "plainTeXt contributors")]
#[command(version)]
#[command(about = "Convert plainTeXt flat-text documents to LaTeX and JSON", long_about = None)]
struct Cli {
    /// Input flat-text file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Typeset a flat-text file as LaTeX
    #[command(alias = "tex")]
    Latex {
        /// Input flat-text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output .tex file (next to the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit only the document body
        #[arg(long)]
        body_only: bool,

        /// Path prefix for image files
        #[arg(long, value_name = "PREFIX", default_value = "images/")]
        image_prefix: String,

        /// Fail on the first malformed directive
        #[arg(long)]
        strict: bool,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,
    },

    /// Dump the parsed document as JSON
    Json {
        /// Input flat-text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Report blocks, images and problems in a flat-text file
    Check {
        /// Input flat-text file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Rewrite a flat-text file through parse and serialize
    Normalize {
        /// Input flat-text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (overwrites the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization only)
    Minimal,
    /// Standard cleanup
    Standard,
    /// Aggressive cleanup (ligatures, private-use characters)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Latex {
            input,
            output,
            body_only,
            image_prefix,
            strict,
            cleanup,
        }) => cmd_latex(
            &input,
            output.as_deref(),
            body_only,
            &image_prefix,
            strict,
            cleanup,
        ),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Check { input }) => cmd_check(&input),
        Some(Commands::Normalize { input, output }) => cmd_normalize(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: typeset if input is provided
            if let Some(input) = cli.input {
                cmd_latex(&input, None, false, "images/", false, None)
            } else {
                println!("{}", "Usage: plaintext <FILE>".yellow());
                println!("       plaintext --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_flat_file(input: &Path) -> Result<FlatFile, Box<dyn std::error::Error>> {
    log::debug!("reading {}", input.display());
    let contents = fs::read_to_string(input)?;
    Ok(FlatFile::parse(&contents))
}

fn sibling_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
}

fn cmd_latex(
    input: &Path,
    output: Option<&Path>,
    body_only: bool,
    image_prefix: &str,
    strict: bool,
    cleanup: Option<CleanupLevel>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = read_flat_file(input)?;

    let mut options = RenderOptions::new().with_image_prefix(image_prefix);
    if body_only {
        options = options.body_only();
    }
    if strict {
        options = options.with_error_mode(plaintext::ErrorMode::Strict);
    }
    if let Some(level) = cleanup {
        options = options.with_cleanup_preset(level.into());
    }

    let result = plaintext::render::to_latex_with_images(&file.text, &file.images, &options)?;
    print_diagnostics(&result.diagnostics);

    let tex_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_path(input, "tex"));
    fs::write(&tex_path, &result.content)?;
    println!("{} {}", "Saved to".green(), tex_path.display());

    if let Some(ref bibliography) = result.bibliography {
        let bib_path = tex_path.with_file_name(format!("{}.bib", options.bibliography_name));
        fs::write(&bib_path, bibliography)?;
        println!("{} {}", "Saved to".green(), bib_path.display());
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = read_flat_file(input)?;
    let parsed = file.parse_with(ParseOptions::new())?;
    print_diagnostics(&parsed.diagnostics);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = plaintext::render::to_json(&parsed.document, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = read_flat_file(input)?;
    let parsed = file.parse_with(ParseOptions::new())?;
    let doc = &parsed.document;

    let emitted = plaintext::render::document_to_latex(
        doc,
        &RenderOptions::new().body_only().with_stats(true),
    )?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Lines".bold(), file.text.split('\n').count());
    println!("{}: {}", "Blocks".bold(), doc.block_count());

    let count = |pred: fn(&Block) -> bool| doc.blocks.iter().filter(|b| pred(b)).count();
    println!(
        "{}: {}",
        "Paragraphs".bold(),
        count(|b| matches!(b, Block::Paragraph(_)))
    );
    println!("{}: {}", "Code".bold(), count(|b| matches!(b, Block::Code(_))));
    println!("{}: {}", "Tables".bold(), count(|b| matches!(b, Block::Table(_))));
    println!("{}: {}", "Figures".bold(), count(|b| matches!(b, Block::Figure(_))));
    println!("{}: {}", "Images".bold(), file.images.len());

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = &emitted.stats;
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Sections".bold(), stats.section_count);
    println!("{}: {}", "Theorems".bold(), stats.theorem_count);
    println!("{}: {}", "Equations".bold(), stats.equation_count);
    println!("{}: {}", "References".bold(), stats.reference_count);
    println!("{}: {}", "Bib entries".bold(), stats.bib_entry_count);

    let diagnostics: Vec<&Diagnostic> = parsed
        .diagnostics
        .iter()
        .chain(emitted.diagnostics.iter())
        .collect();

    println!();
    if diagnostics.is_empty() {
        println!("{}", "No problems found".green().bold());
    } else {
        println!(
            "{} {}",
            diagnostics.len().to_string().yellow().bold(),
            "problems found".yellow()
        );
        for diagnostic in diagnostics {
            println!("  {} {}", "├─".dimmed(), diagnostic);
        }
    }

    Ok(())
}

fn cmd_normalize(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let file = read_flat_file(input)?;
    let parsed = file.parse_with(ParseOptions::new().keep_stale_images())?;
    print_diagnostics(&parsed.diagnostics);

    let mut normalized = FlatFile::from_document(&parsed.document);
    // Images no block refers to still belong to the file.
    for (id, payload) in file.images.iter() {
        if !normalized.images.contains(id) {
            normalized.images.insert(id.clone(), payload.clone());
        }
    }

    let path = output.unwrap_or(input);
    fs::write(path, normalized.to_string())?;
    println!("{} {}", "Saved to".green(), path.display());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "plaintext".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Flat-text to LaTeX transcoder");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/atEchoOff/plainTeXt".dimmed()
    );
    println!("License: MIT");
}
