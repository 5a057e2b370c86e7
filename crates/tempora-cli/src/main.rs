//! tempora: timeline and loop tooling for sequencer projects

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tempora")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Measure, loop and theme tooling for sequencer projects", long_about = None)]
struct Args {
    /// Project file (JSON); an empty project is used when omitted
    #[arg(short, long, global = true, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the measure containing a tick
    Measure {
        tick: u64,
    },
    /// List time signature spans with their start ticks
    Spans,
    /// Convert a tick to seconds
    Time {
        tick: u64,
    },
    /// Snap a tick to the project's grid
    Snap {
        tick: u64,
    },
    /// Inspect or change the loop range
    Loop {
        #[command(subcommand)]
        action: LoopAction,
    },
    /// Generate the color scheme
    Theme {
        /// Dark variant (overrides the config)
        #[arg(long)]
        dark: bool,
        /// Print CSS custom properties instead of role colors
        #[arg(long)]
        css: bool,
        /// Report role pairs below their contrast targets
        #[arg(long)]
        check: bool,
        /// Grade contrast with APCA instead of WCAG 2.1
        #[arg(long, requires = "check")]
        apca: bool,
    },
    /// Write the default config file
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum LoopAction {
    /// Print the loop state
    Show,
    Enable,
    Disable,
    /// Set both loop bounds
    Set {
        start: u64,
        end: u64,
    },
    /// Unset the loop bounds
    Clear,
    /// Loop the measure under a viewport pixel
    Measure {
        #[arg(long)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        offset: f64,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let app_config = config::load_config(&config_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&app_config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!(config = %config_path.display(), "Loaded config");

    commands::run(args, &app_config, &config_path)
}
