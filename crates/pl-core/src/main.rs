//! process_list CLI.
//!
//! The main entry point for pl-core, handling:
//! - Listing processes, optionally on a remote machine
//! - Lookups by PID and by image name
//! - Showing the resolved configuration

use clap::{Args, Parser, Subcommand};
use pl_common::{format_error_human, Error, OutputFormat, ProcessId, StructuredError};
use pl_config::{load_config, ConfigError, LoadedConfig};
use pl_core::cli::QueryFlags;
use pl_core::collect::{
    QueryError, QueryOptions, QueryOutput, Schema, TaskList, TaskListConfig,
};
use pl_core::exit_codes::ExitCode;
use pl_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Stage,
};
use pl_core::output::{write_report, ProcessReport};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info_span, warn, Instrument};

/// List processes on a local or remote Windows machine via tasklist.exe
#[derive(Parser)]
#[command(name = "pl-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to config.toml (otherwise PL_CONFIG, PL_CONFIG_DIR, XDG, /etc)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Log level for stderr (trace, debug, info, warn, error, off)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format for stderr (human, jsonl)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Kill the utility if a query takes longer than this (seconds)
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: Option<u64>,

    #[command(flatten)]
    query: QueryFlags,
}

#[derive(Subcommand)]
enum Commands {
    /// List processes
    List,

    /// Show one process by PID (exit code 1 if absent)
    Get {
        /// Process ID
        pid: ProcessId,
    },

    /// List processes with the given image name
    Find {
        /// Image name, e.g. notepad.exe
        name: String,
    },

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved configuration and effective query options
    Show,
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too and are not failures.
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let run_id = generate_run_id();
    let span = info_span!("run", run_id = %run_id);
    let exit_code = run(&cli, &run_id).instrument(span).await;

    std::process::exit(exit_code.as_i32());
}

async fn run(cli: &Cli, run_id: &str) -> ExitCode {
    debug!(event = event_names::RUN_STARTED, "starting");

    let exit_code = match &cli.command {
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
        Commands::List | Commands::Get { .. } | Commands::Find { .. } | Commands::Config(_) => {
            match cli.global.query.validate().and_then(|()| load(&cli.global)) {
                Ok(loaded) => dispatch(cli, &loaded, run_id).await,
                Err(err) => output_error(&cli.global, &err),
            }
        }
    };

    debug!(event = event_names::RUN_FINISHED, exit_code = %exit_code, "done");
    exit_code
}

async fn dispatch(cli: &Cli, loaded: &LoadedConfig, run_id: &str) -> ExitCode {
    match &cli.command {
        Commands::List => run_list(&cli.global, loaded, run_id).await,
        Commands::Get { pid } => run_get(&cli.global, loaded, run_id, *pid).await,
        Commands::Find { name } => run_find(&cli.global, loaded, run_id, name).await,
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => run_config_show(&cli.global, loaded),
        },
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

fn load(global: &GlobalOpts) -> Result<LoadedConfig, Error> {
    let _span = info_span!("config", stage = %Stage::Init).entered();
    let loaded = load_config(global.config.as_deref()).map_err(config_error)?;

    match &loaded.path {
        Some(path) => debug!(
            event = event_names::CONFIG_LOADED,
            path = %path.display(),
            source = %loaded.source,
            "configuration loaded"
        ),
        None => debug!(
            event = event_names::CONFIG_DEFAULT_USED,
            "no config file found; using defaults"
        ),
    }
    for warning in &loaded.warnings {
        warn!(event = event_names::CONFIG_WARNING, "{}", warning);
    }
    Ok(loaded)
}

fn config_error(err: ConfigError) -> Error {
    tracing::error!(event = event_names::CONFIG_ERROR, error = %err, "configuration rejected");
    match err {
        ConfigError::NotFound { path } => Error::ConfigNotFound(path.display().to_string()),
        other => Error::Config(other.to_string()),
    }
}

fn tasklist(global: &GlobalOpts, loaded: &LoadedConfig) -> TaskList {
    let mut config = TaskListConfig::from_settings(&loaded.settings.tasklist);
    if let Some(secs) = global.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    TaskList::new(config)
}

fn query_options(global: &GlobalOpts, loaded: &LoadedConfig) -> QueryOptions {
    global
        .query
        .apply(QueryOptions::from_defaults(&loaded.settings.query))
}

// ============================================================================
// Command implementations
// ============================================================================

async fn run_list(global: &GlobalOpts, loaded: &LoadedConfig, run_id: &str) -> ExitCode {
    let options = query_options(global, loaded);
    let list = tasklist(global, loaded);
    let output = collect(&list, &options, list.try_query(&options).await);
    emit(global, "list", run_id, &options, &output)
}

async fn run_find(
    global: &GlobalOpts,
    loaded: &LoadedConfig,
    run_id: &str,
    name: &str,
) -> ExitCode {
    let options = query_options(global, loaded);
    let list = tasklist(global, loaded);
    let output = collect(&list, &options, list.try_find_by_name(name, &options).await);
    emit(global, "find", run_id, &options, &output)
}

async fn run_get(
    global: &GlobalOpts,
    loaded: &LoadedConfig,
    run_id: &str,
    pid: ProcessId,
) -> ExitCode {
    let options = query_options(global, loaded);
    let list = tasklist(global, loaded);
    let output = collect(&list, &options, list.try_find_by_id(pid, &options).await);
    if output.records.is_empty() {
        return output_error(global, &Error::ProcessNotFound { pid: pid.0 });
    }
    emit(global, "get", run_id, &options, &output)
}

/// Degrade a failed query to an empty listing like the library lookups do,
/// while keeping the metadata when there is some.
fn collect(
    list: &TaskList,
    options: &QueryOptions,
    result: Result<QueryOutput, QueryError>,
) -> QueryOutput {
    match result {
        Ok(output) => output,
        Err(err) => {
            warn!(
                event = event_names::QUERY_FAILED,
                program = %list.config().program,
                error = %err,
                "process query failed; returning no processes"
            );
            let mut output = QueryOutput::default();
            output.metadata.program = list.config().program.clone();
            output.metadata.mode = Schema::resolve(options).mode().to_string();
            output.metadata.system = options.system.clone().filter(|s| !s.is_empty());
            output.metadata.started_at = chrono::Utc::now().to_rfc3339();
            output.metadata.warnings.push(err.to_string());
            output
        }
    }
}

fn emit(
    global: &GlobalOpts,
    command: &str,
    run_id: &str,
    options: &QueryOptions,
    output: &QueryOutput,
) -> ExitCode {
    let _span = info_span!("output", stage = %Stage::Output).entered();
    let schema = Schema::resolve(options);
    let report = ProcessReport::new(command, run_id, &output.metadata, &output.records);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match write_report(&mut out, global.format, &report, schema.fields()) {
        Ok(()) => {
            debug!(
                event = event_names::OUTPUT_WRITTEN,
                format = %global.format,
                records = output.records.len(),
                "output written"
            );
            ExitCode::Clean
        }
        Err(err) => output_error(global, &Error::Io(err)),
    }
}

/// Display the resolved configuration. The password is never printed.
fn run_config_show(global: &GlobalOpts, loaded: &LoadedConfig) -> ExitCode {
    let options = query_options(global, loaded);
    let list = tasklist(global, loaded);
    let path = loaded.path.as_ref().map(|p| p.display().to_string());

    let response = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "source": loaded.source.to_string(),
        "path": path,
        "settings": &loaded.settings,
        "effective": {
            "program": &list.config().program,
            "timeout_secs": list.config().timeout.map(|t| t.as_secs()),
            "mode": Schema::resolve(&options).mode().to_string(),
            "query": &options,
            "password_set": options.password.is_some(),
        },
        "warnings": &loaded.warnings,
    });

    let summary = ConfigSummary {
        source: loaded.source.to_string(),
        path: path.as_deref().unwrap_or("-"),
        program: &list.config().program,
        mode: Schema::resolve(&options).mode().to_string(),
        options: &options,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match write_config(&mut out, global.format, &response, &summary) {
        Ok(()) => ExitCode::Clean,
        Err(err) => output_error(global, &Error::Io(err)),
    }
}

struct ConfigSummary<'a> {
    source: String,
    path: &'a str,
    program: &'a str,
    mode: String,
    options: &'a QueryOptions,
}

fn write_config<W: Write>(
    out: &mut W,
    format: OutputFormat,
    response: &serde_json::Value,
    summary: &ConfigSummary<'_>,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, response)?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            serde_json::to_writer(&mut *out, response)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => writeln!(
            out,
            "config: source={} path={} program={} mode={}",
            summary.source, summary.path, summary.program, summary.mode
        )?,
        OutputFormat::Table => {
            writeln!(out, "# pl-core config show")?;
            writeln!(out)?;
            writeln!(out, "Source: {}", summary.source)?;
            writeln!(out, "Path: {}", summary.path)?;
            writeln!(out, "Program: {}", summary.program)?;
            writeln!(out, "Mode: {}", summary.mode)?;
            // Debug masks the password.
            writeln!(out, "Options: {:?}", summary.options)?;
        }
    }
    out.flush()
}

fn print_version(global: &GlobalOpts) {
    let version = env!("CARGO_PKG_VERSION");
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            println!(
                "{}",
                serde_json::json!({ "name": "pl-core", "version": version })
            );
        }
        _ => println!("pl-core {}", version),
    }
}

/// Report an error on stderr in the appropriate format.
fn output_error(global: &GlobalOpts, error: &Error) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            eprintln!("{}", StructuredError::from(error).to_json());
        }
        _ => {
            eprintln!(
                "{}",
                format_error_human(error, std::io::stderr().is_terminal())
            );
        }
    }
    ExitCode::from(error)
}
