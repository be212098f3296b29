use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use thmsync::context::ProjectContext;
use thmsync::Result;

#[derive(Parser)]
#[command(name = "thmsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync theorem formalization records with a downstream YAML file", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/thmsync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the downstream file from the theorem records
    Downstream {
        /// Output file (default: downstream_file from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Update the theorem records from a downstream file
    Upstream {
        /// Downstream YAML file to read
        input: PathBuf,

        /// Report what would change without writing records
        #[arg(long)]
        dry_run: bool,

        /// Print the per-theorem report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every theorem record
    Check,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "thmsync", &mut io::stdout());
        return Ok(());
    }

    let context = ProjectContext::load(cli.root.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Downstream { output } => {
            if !cli.quiet {
                println!("{}", "📤 Generating downstream file...".cyan());
            }
            thmsync::cli::downstream::run(&context, output.as_deref(), cli.quiet)?;
        }

        Commands::Upstream {
            input,
            dry_run,
            json,
        } => {
            if !cli.quiet && !json {
                println!("{}", format!("📥 Reconciling records with {}", input.display()).cyan());
            }
            thmsync::cli::upstream::run(&context, &input, dry_run, json, cli.quiet)?;
        }

        Commands::Check => {
            thmsync::cli::check::run(&context, cli.quiet)?;
        }

        Commands::Completions { .. } => unreachable!("completions are handled before loading the project"),
    }

    Ok(())
}
