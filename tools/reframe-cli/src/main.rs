//! Reframe CLI: create, edit, plan, and export reframing projects.
//!
//! Usage:
//!   reframe init <NAME>            Create a new project
//!   reframe info <PATH>            Show project information
//!   reframe validate <PATH>        Validate a project bundle
//!   reframe edit <PATH> <OP>       Apply one edit to a clip and save
//!   reframe plan <PATH>            Sample the live clip frame by frame
//!   reframe export <PATH>          Write the export request for a renderer

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use reframe_common::config::AppConfig;

mod commands;

use commands::edit::EditOp;

#[derive(Parser)]
#[command(
    name = "reframe",
    about = "Crop, highlight, trim, and retime screen recordings for any aspect ratio",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty project
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Target aspect ratio, e.g. 9:16
        #[arg(long)]
        aspect: Option<String>,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Validate a project bundle
    Validate {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Apply an edit to a clip and save the project
    Edit {
        /// Path to the project directory
        path: PathBuf,

        /// Clip to edit (defaults to the active clip)
        #[arg(short, long, global = true)]
        clip: Option<String>,

        #[command(subcommand)]
        op: EditOp,
    },

    /// Compute the per-frame plan of a clip
    Plan {
        /// Path to the project directory
        path: PathBuf,

        /// Clip to plan (defaults to the active clip)
        #[arg(short, long)]
        clip: Option<String>,

        /// Output framerate (defaults to the configured value)
        #[arg(long)]
        fps: Option<f64>,

        /// Write the full plan as JSON instead of a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble and write the export request
    Export {
        /// Path to the project directory
        path: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    reframe_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            aspect,
        } => commands::init::run(&config, name, output, aspect),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(&config, path),
        Commands::Edit { path, clip, op } => commands::edit::run(&config, path, clip, op),
        Commands::Plan {
            path,
            clip,
            fps,
            output,
        } => commands::plan::run(&config, path, clip, fps, output),
        Commands::Export {
            path,
            output,
            compact,
        } => commands::export::run(&config, path, output, compact),
    }
}
