// TensorHub CLI - authenticate and upload model archives

mod commands;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

/// Error carrying an exit code and an optional remediation hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Parser)]
#[command(name = "thub")]
#[command(about = "Upload machine-learning models to TensorHub")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and store a session token
    Login,

    /// Drop the stored session
    Logout,

    /// Upload a model archive and register it
    #[command(after_help = "\
Examples:
  thub upload model.tar.gz --framework pt --name digit-classifier
  thub upload weights.tar.gz --framework tf --no-token
  thub upload model.tar.gz --framework hf --output json")]
    Upload {
        /// Path to the gzip-tar model archive
        archive: PathBuf,

        /// Display name for the model (defaults to the archive file stem)
        #[arg(long)]
        name: Option<String>,

        /// Model framework: tf, pt, or hf
        #[arg(long, short = 'f')]
        framework: String,

        /// Skip minting a query access token
        #[arg(long)]
        no_token: bool,

        /// Print the result as JSON
        #[arg(long, value_parser = ["text", "json"], default_value = "text")]
        output: String,
    },

    /// Show or set the service base URL
    BaseUrl {
        /// New base URL (omit to print the current one)
        url: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login => commands::cmd_login(),
        Commands::Logout => commands::cmd_logout(),
        Commands::Upload { archive, name, framework, no_token, output } => {
            commands::cmd_upload(archive, name, framework, no_token, output == "json")
        }
        Commands::BaseUrl { url } => commands::cmd_base_url(url),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(err.code)
        }
    }
}
