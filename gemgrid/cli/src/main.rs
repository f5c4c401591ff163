use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use gemgrid_core::{quantize_bytes, QuantizeConfig, Quantized, Resample};

/// Command-line front end for the gemgrid pattern engine.
#[derive(Parser, Debug)]
#[command(
    name = "gemgrid",
    about = "Turn an image into a paint-by-symbol pattern",
    long_about = "Downsample an image to a grid, reduce it to a bounded palette and print \
                  the symbol legend together with the symbol grid."
)]
struct Cli {
    /// Path to the input image.
    input: PathBuf,
    /// Optional path to write the pattern to. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Cells per side of a square grid.
    #[arg(
        short = 'g',
        long,
        default_value_t = 30,
        value_parser = parse_grid_size,
        help = "Cells per side of the grid (5-200)."
    )]
    grid_size: u32,
    /// Overrides the grid width.
    #[arg(long, value_parser = parse_grid_size)]
    grid_width: Option<u32>,
    /// Overrides the grid height.
    #[arg(long, value_parser = parse_grid_size)]
    grid_height: Option<u32>,
    /// Maximum number of palette colors.
    #[arg(
        short = 'c',
        long,
        default_value_t = 10,
        value_parser = parse_colors,
        help = "Maximum number of palette colors (2-50)."
    )]
    colors: usize,
    /// Resampling used when shrinking the image to the grid.
    #[arg(long, value_enum, default_value_t = Filter::Bilinear)]
    filter: Filter,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Print debug info about the parsed options.
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Filter {
    Nearest,
    Bilinear,
}

impl From<Filter> for Resample {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => Resample::Nearest,
            Filter::Bilinear => Resample::Bilinear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn parse_grid_size(value: &str) -> Result<u32, String> {
    parse_u32_range(value, "grid size", 5, 200)
}

fn parse_colors(value: &str) -> Result<usize, String> {
    parse_u32_range(value, "colors", 2, 50).map(|colors| colors as usize)
}

fn parse_u32_range(value: &str, name: &str, min: u32, max: u32) -> Result<u32, String> {
    let parsed: u32 = value
        .parse()
        .map_err(|_| format!("{name} must be a whole number between {min} and {max}"))?;
    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("{name} must be between {min} and {max}"))
    }
}

fn build_config(cli: &Cli) -> QuantizeConfig {
    QuantizeConfig {
        grid_width: cli.grid_width.unwrap_or(cli.grid_size),
        grid_height: cli.grid_height.unwrap_or(cli.grid_size),
        max_colors: cli.colors,
        filter: cli.filter.into(),
    }
}

/// Legend lines (`symbol  #rrggbb  count`) followed by the symbol grid.
fn render_text(result: &Quantized) -> String {
    let mut out = String::new();
    for entry in &result.palette {
        writeln!(out, "{}  {}  {}", entry.symbol, entry.color, entry.count).ok();
    }
    out.push('\n');
    for row in result.symbol_rows() {
        out.push_str(&row);
        out.push('\n');
    }
    out
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("[gemgrid] error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let image_bytes = fs::read(&cli.input)
        .with_context(|| format!("failed to read input file: {}", cli.input.display()))?;

    let config = build_config(&cli);
    if cli.debug {
        eprintln!("[gemgrid] config: {:?}", config);
    }

    let result = quantize_bytes(&image_bytes, &config)
        .with_context(|| format!("failed to build a pattern from {}", cli.input.display()))?;
    log::info!(
        "pattern {}x{} with {} colors",
        result.width(),
        result.height(),
        result.palette.len()
    );

    let rendered = match cli.format {
        Format::Text => render_text(&result),
        Format::Json => serde_json::to_string_pretty(&result).context("failed to serialize pattern")?,
    };

    match cli.output {
        Some(path) => {
            fs::write(&path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            print!("{}", rendered);
        }
    }

    Ok(())
}
