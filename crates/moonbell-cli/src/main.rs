use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "moonbell-cli", version, about = "Moonbell CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder loop
    Run,
    /// Run a single evaluation tick
    Tick {
        /// Evaluate as if now were this local datetime (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        at: Option<String>,
    },
    /// Solar/lunar date conversion
    Convert {
        #[command(subcommand)]
        action: commands::convert::ConvertAction,
    },
    /// List upcoming occurrences
    Events {
        /// Days of lookahead (defaults to the configured horizon)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Sent-reminder records
    Sent {
        #[command(subcommand)]
        action: commands::sent::SentAction,
    },
}

fn main() {
    let cli = Cli::parse();

    // the adapters block_on this runtime from sync code
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let _guard = runtime.enter();

    let result = match cli.command {
        Commands::Run => commands::run::run(),
        Commands::Tick { at } => commands::tick::run(at),
        Commands::Convert { action } => commands::convert::run(action),
        Commands::Events { days } => commands::events::run(days),
        Commands::Config { action } => commands::config::run(action),
        Commands::Sent { action } => commands::sent::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
