//! mklev: generate dungeon levels from the command line
//!
//! Prints the ASCII map of each level, or a JSON snapshot with `--json`.
//! Several levels in a row share one random stream, the way a game would
//! build a dungeon level by level.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use dgn_core::{generate_level, GenOptions, RandomStream, RngBackend};

/// Generate roguelike dungeon levels
#[derive(Parser, Debug)]
#[command(name = "mklev")]
#[command(author, version, about = "Generate deterministic dungeon levels", long_about = None)]
struct Args {
    /// Seed for the random stream
    #[arg(short = 's', long = "seed", default_value_t = 42)]
    seed: u64,

    /// Depth of the first level
    #[arg(short = 'd', long = "depth", default_value_t = 1)]
    depth: i32,

    /// Number of consecutive levels to generate
    #[arg(short = 'n', long = "count", default_value_t = 1)]
    count: u32,

    /// Raw generator behind the stream
    #[arg(short = 'b', long = "backend", value_enum, default_value_t = Backend::Isaac64)]
    backend: Backend,

    /// Generation options as a JSON file
    #[arg(short = 'o', long = "options")]
    options: Option<PathBuf>,

    /// Force a theme shape by name
    #[arg(long = "theme")]
    theme: Option<String>,

    /// Force a theme fill by name
    #[arg(long = "fill")]
    fill: Option<String>,

    /// Print a JSON snapshot instead of the map
    #[arg(long = "json")]
    json: bool,

    /// Dump every random draw to stderr
    #[arg(long = "trace")]
    trace: bool,

    /// List the theme shapes and fills and exit
    #[arg(long = "list-themes")]
    list_themes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Isaac64,
    Chacha8,
}

impl From<Backend> for RngBackend {
    fn from(b: Backend) -> Self {
        match b {
            Backend::Isaac64 => RngBackend::Isaac64,
            Backend::Chacha8 => RngBackend::ChaCha8,
        }
    }
}

fn load_options(args: &Args) -> dgn_core::Result<GenOptions> {
    let mut options = match &args.options {
        Some(path) => GenOptions::from_json_file(path)?,
        None => GenOptions::default(),
    };
    if args.theme.is_some() {
        options.theme_override = args.theme.clone();
    }
    if args.fill.is_some() {
        options.fill_override = args.fill.clone();
    }
    options.validate()?;
    Ok(options)
}

fn list_themes() {
    println!("Shapes:");
    for s in dgn_core::themes::SHAPES {
        println!("  {:<20} {:>5}", s.name, s.frequency);
    }
    println!("Fills:");
    for f in dgn_core::themes::FILLS {
        println!("  {:<20} {:>5}  depth {}+", f.name, f.frequency, f.min_depth);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if args.list_themes {
        list_themes();
        return Ok(());
    }

    let options = load_options(&args)?;
    let mut rng = RandomStream::with_backend(args.backend.into(), args.seed);
    if args.trace {
        rng.enable_tracing();
    }

    let mut levels = Vec::new();
    for i in 0..args.count {
        let depth = args.depth + i as i32;
        let level = generate_level(&mut rng, depth, &options)?;

        if args.trace {
            for e in rng.take_trace() {
                eprintln!("{} {}({}) = {}", e.seq, e.func, e.arg, e.result);
            }
        }

        if args.json {
            levels.push(level);
        } else {
            let rooms = level.top_level_rooms().count();
            println!(
                "depth {depth}, seed {}, {rooms} rooms, {} draws so far",
                args.seed,
                rng.call_count()
            );
            print!("{}", level.render());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&levels)?);
    }
    Ok(())
}
