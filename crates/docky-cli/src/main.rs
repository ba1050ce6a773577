mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE};
use docky_core::Operation;
use docky_runtime::DockerEngine;
use docky_schema::parse_config_file;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "docky",
    version,
    about = "Declarative desired state for named containers"
)]
struct Cli {
    /// Path to the config file.
    #[arg(short = 'f', long, default_value = "~/docky.yml", global = true)]
    config: String,

    /// Container engine command.
    #[arg(long, default_value = "docker", global = true)]
    docker: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report drift between the config and the engine's containers.
    Check {
        /// Container names (default: all configured containers).
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Start containers.
    Start {
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Stop containers.
    Stop {
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Stop, then start containers.
    Restart {
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Create and run containers that do not exist yet.
    Launch {
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Destroy and launch containers again, keeping their bound host ports.
    Relaunch {
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Stop and remove containers that can be launched again.
    Destroy {
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("DOCKY_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let (operation, names) = match cli.command {
        Commands::Completions { shell } => {
            return exit_code(commands::completions::run::<Cli>(shell));
        }
        Commands::Check { names } => (Operation::Check, names),
        Commands::Start { names } => (Operation::Start, names),
        Commands::Stop { names } => (Operation::Stop, names),
        Commands::Restart { names } => (Operation::Restart, names),
        Commands::Launch { names } => (Operation::Launch, names),
        Commands::Relaunch { names } => (Operation::Relaunch, names),
        Commands::Destroy { names } => (Operation::Destroy, names),
    };

    exit_code(run_operation(
        &cli.config,
        &cli.docker,
        operation,
        &names,
        cli.json,
    ))
}

fn run_operation(
    config_arg: &str,
    docker: &str,
    operation: Operation,
    names: &[String],
    json: bool,
) -> Result<u8, String> {
    let config_path = expand_tilde(config_arg);
    if !config_path.exists() {
        return Err(format!("{}: file not found", config_path.display()));
    }
    let config = parse_config_file(&config_path).map_err(|e| e.to_string())?;
    let engine = DockerEngine::new(docker);

    if operation == Operation::Check {
        commands::check::run(&config, &engine, names, json)
    } else {
        commands::apply::run(&config, &engine, operation, names, json)
    }
}

fn exit_code(result: Result<u8, String>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("failed to parse config")
                || msg.starts_with("failed to read config")
                || msg.starts_with("config root")
                || msg.starts_with("duplicate container name")
                || msg.starts_with("container ")
            {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
