use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "audio")]
mod audio;
mod commands;
mod host;

#[derive(Parser)]
#[command(name = "studytimer-cli", version, about = "Study Timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or resume) a session and drive it in the terminal
    Run {
        /// Study period in minutes
        #[arg(long)]
        study: Option<u32>,
        /// Break period in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
    },
    /// Start a session without driving it
    Start {
        /// Study period in minutes
        #[arg(long)]
        study: Option<u32>,
        /// Break period in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
    },
    /// Print the current session state as JSON
    Status,
    /// End the current delay early
    Skip,
    /// Stop the session and print its summary as JSON
    Stop,
    /// Print today's study total
    Today,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("STUDYTIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            study,
            break_minutes,
        } => commands::run::run(study, break_minutes),
        Commands::Start {
            study,
            break_minutes,
        } => commands::session::start(study, break_minutes),
        Commands::Status => commands::session::status(),
        Commands::Skip => commands::session::skip(),
        Commands::Stop => commands::session::stop(),
        Commands::Today => commands::session::today_total(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
