use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use toolbench_core::Config;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "toolbench", version, about = "Toolbench CLI")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rent-vs-buy housing calculator
    Housing {
        #[command(subcommand)]
        action: commands::housing::HousingAction,
    },
    /// BMI, calorie and macro calculator
    Health {
        #[command(subcommand)]
        action: commands::health::HealthAction,
    },
    /// Survey sample size calculator
    SampleSize {
        #[command(subcommand)]
        action: commands::sample_size::SampleSizeAction,
    },
    /// QR code payload generator
    Qr {
        #[command(subcommand)]
        action: commands::qr::QrAction,
    },
    /// Social media content calendar
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// To-do list
    Todo {
        #[command(subcommand)]
        action: commands::todo::TodoAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Install the stderr subscriber. `RUST_LOG` wins, then `-v`, then the
/// configured level.
fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(cli.verbose, &config.logging.level);

    let result = match cli.command {
        Commands::Housing { action } => commands::housing::run(action, &config),
        Commands::Health { action } => commands::health::run(action),
        Commands::SampleSize { action } => commands::sample_size::run(action),
        Commands::Qr { action } => commands::qr::run(action),
        Commands::Calendar { action } => commands::calendar::run(action),
        Commands::Todo { action } => commands::todo::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "toolbench", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
