//! Command-line host for the tech-pack canvas engine.
//!
//! The interactive hosts feed pointer events and persist actions; this
//! binary covers the non-interactive jobs around them: checking a
//! document, listing what each side carries, and flattening a side to a
//! PNG for line sheets and factory handoff.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stitchmark_canvas::document::{DocumentError, TechPack};
use stitchmark_canvas::engine::Engine;
use stitchmark_canvas::raster::{self, RasterError};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),
    #[error("composite failed: {0}")]
    Raster(#[from] RasterError),
    #[error("side `{0}` has no sketch image to composite")]
    NoSketch(String),
}

#[derive(Parser, Debug)]
#[command(name = "stitchmark", about = "Garment tech-pack annotation tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a tech-pack document and report whether it is usable
    Validate {
        /// Path to the tech-pack JSON document
        doc: PathBuf,
    },
    /// List every side in a document with its annotation counts
    Sides {
        /// Path to the tech-pack JSON document
        doc: PathBuf,
    },
    /// Flatten one side's sketch, fills, and annotations into a PNG
    Composite {
        /// Path to the tech-pack JSON document
        doc: PathBuf,

        /// Which side of the garment to flatten
        #[arg(long, env = "STITCHMARK_SIDE", default_value = "front")]
        side: String,

        /// Where to write the flattened PNG
        #[arg(long, env = "STITCHMARK_OUT", default_value = "composite.png")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Validate { doc } => run_validate(&doc),
        Command::Sides { doc } => run_sides(&doc),
        Command::Composite { doc, side, out } => run_composite(&doc, &side, &out),
    }
}

fn load_document(path: &Path) -> Result<TechPack, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(TechPack::from_json(&raw)?)
}

fn run_validate(path: &Path) -> Result<(), CliError> {
    let pack = load_document(path)?;
    let annotations: usize = pack
        .sides
        .values()
        .map(|side| {
            let layers = &side.layers;
            layers.pins.len()
                + layers.strokes.len()
                + layers.lines.len()
                + layers.graphics.len()
                + layers.fills.len()
        })
        .sum();

    println!(
        "ok: {} side(s), {} annotation(s), {} measurement(s)",
        pack.sides.len(),
        annotations,
        pack.measurements.len()
    );
    Ok(())
}

fn run_sides(path: &Path) -> Result<(), CliError> {
    let pack = load_document(path)?;
    if pack.sides.is_empty() {
        println!("no sides");
        return Ok(());
    }

    for (name, side) in &pack.sides {
        let layers = &side.layers;
        println!(
            "{name}: sketch={} pins={} strokes={} lines={} graphics={} fills={}",
            if side.image.is_some() { "yes" } else { "no" },
            layers.pins.len(),
            layers.strokes.len(),
            layers.lines.len(),
            layers.graphics.len(),
            layers.fills.len(),
        );
    }
    Ok(())
}

fn run_composite(path: &Path, side_name: &str, out: &Path) -> Result<(), CliError> {
    let pack = load_document(path)?;
    let side = pack.side(side_name)?;
    if side.image.is_none() {
        return Err(CliError::NoSketch(side_name.to_string()));
    }

    // Drive the engine the way an interactive host would, minus the
    // pointer stream: hand it the side's image and layers, then flatten
    // the resulting display list.
    let mut engine = Engine::new();
    engine.set_image(side.image.clone());
    engine.sync_layers(side.layers.clone());

    let ops = engine.display_list(&pack.measurements);
    let flattened = raster::flatten_side(&ops, engine.fill_composite())?;
    let bytes = raster::encode_png(&flattened)?;

    fs::write(out, bytes).map_err(|source| CliError::Write {
        path: out.to_path_buf(),
        source,
    })?;

    info!(
        side = side_name,
        out = %out.display(),
        width = flattened.width(),
        height = flattened.height(),
        "composite written"
    );
    println!(
        "wrote {} ({}x{})",
        out.display(),
        flattened.width(),
        flattened.height()
    );
    Ok(())
}
