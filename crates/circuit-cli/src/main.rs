use circuit_core::Config;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "circuit", version, about = "Circuit interval timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a timer in real time
    Run(commands::run::RunArgs),
    /// Run a timer to completion instantly and print its events
    Simulate(commands::simulate::SimulateArgs),
    /// Show a timer's segments and total duration
    Summary {
        /// Timer file path or stored timer name
        timer: String,
    },
    /// List available sounds
    Sounds,
    /// List stored timers
    Timers,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// RUST_LOG wins; otherwise `logging.level` from the config file.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&Config::load_or_default());

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Summary { timer } => commands::summary::run(&timer),
        Commands::Sounds => commands::sounds::run(),
        Commands::Timers => commands::timers::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
