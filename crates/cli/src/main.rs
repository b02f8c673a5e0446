mod cmd;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Student records and exam results service.
#[derive(Parser)]
#[command(
    name = "scholar",
    version,
    about = "Student records and exam results service"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
        /// JSON data file backing the store; omit to keep records in memory
        #[arg(long)]
        data: Option<PathBuf>,
        /// Path to TLS certificate PEM file (requires --tls-key)
        #[arg(long)]
        tls_cert: Option<PathBuf>,
        /// Path to TLS private key PEM file (requires --tls-cert)
        #[arg(long)]
        tls_key: Option<PathBuf>,
    },

    /// Print result statistics for a data file as JSON
    Stats {
        /// JSON data file to read
        #[arg(long)]
        data: PathBuf,
        /// Only count results from this class (e.g. nazera)
        #[arg(long = "class")]
        class_name: Option<String>,
        /// Only count results from this exam
        #[arg(long)]
        exam: Option<String>,
    },

    /// Create students in bulk from a JSON array
    ImportStudents {
        /// JSON file holding an array of student objects
        file: PathBuf,
        /// JSON data file to write into
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            data,
            tls_cert,
            tls_key,
        } => {
            // Validate TLS flags: both must be provided or neither
            if tls_cert.is_some() != tls_key.is_some() {
                report_error(
                    "error: --tls-cert and --tls-key must both be provided",
                    cli.output,
                    cli.quiet,
                );
                process::exit(1);
            }
            cmd::serve::cmd_serve(
                cmd::serve::ServeFlags {
                    config,
                    port,
                    data,
                    tls_cert,
                    tls_key,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Stats {
            data,
            class_name,
            exam,
        } => {
            cmd::stats::cmd_stats(&data, class_name, exam, cli.output, cli.quiet);
        }
        Commands::ImportStudents { file, data } => {
            cmd::import::cmd_import_students(&file, &data, cli.output, cli.quiet);
        }
    }
}

/// Report an error in the appropriate output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Build the tokio runtime for a command, or exit.
pub(crate) fn runtime(output: OutputFormat, quiet: bool) -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("error: failed to start tokio runtime: {e}"),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}
