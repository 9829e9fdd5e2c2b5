use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use cxx_patcher::actions::{
    generate_definitions, implement_interface, GenerateDefinitionsRequest,
    ImplementInterfaceRequest, Patch, RefactorOptions,
};
use cxx_patcher::config::{load_for, RefactorConfig};
use cxx_patcher::edit::{write_patched, WriteResult};
use cxx_patcher::safety::WorkspaceGuard;
use cxx_patcher::search::WalkdirSearch;
use cxx_patcher::TreeSitterOracle;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cxx-patcher")]
#[command(about = "Deterministic C++ refactoring actions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log verbosity; RUST_LOG takes precedence
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    /// Config file to use instead of the discovered .cxx-patcher.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make the class at a line implement an abstract interface
    ImplementInterface {
        /// Source file containing the class
        file: PathBuf,

        /// Zero-based line inside the class
        #[arg(short, long)]
        line: usize,

        /// Interface name, plain or qualified
        #[arg(short, long)]
        interface: String,

        /// Directory searched for the interface header
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Write the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Show a unified diff instead of the patched file
        #[arg(short, long)]
        diff: bool,

        /// Print the patch as JSON
        #[arg(long, conflicts_with = "diff")]
        json: bool,
    },

    /// Print empty definitions for declarations in a line range
    GenerateDefinitions {
        file: PathBuf,

        /// First zero-based line of the selection
        #[arg(short, long)]
        begin: usize,

        /// Last zero-based line of the selection, inclusive
        #[arg(short, long)]
        end: usize,
    },

    /// Print the effective configuration for a file or directory
    ShowConfig {
        /// Where config discovery starts (defaults to the current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Commands::ImplementInterface {
            file,
            line,
            interface,
            root,
            write,
            diff,
            json,
        } => cmd_implement_interface(
            cli.config.as_deref(),
            &file,
            line,
            &interface,
            root,
            OutputMode { write, diff, json },
        ),

        Commands::GenerateDefinitions { file, begin, end } => {
            cmd_generate_definitions(cli.config.as_deref(), &file, begin, end)
        }

        Commands::ShowConfig { path } => cmd_show_config(cli.config.as_deref(), path),
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

struct OutputMode {
    write: bool,
    diff: bool,
    json: bool,
}

/// Effective config for `target` and the file it came from.
fn load_config(explicit: Option<&Path>, target: &Path) -> Result<(RefactorConfig, Option<PathBuf>)> {
    let (config, source) = load_for(target, explicit)?;
    if let Some(source) = &source {
        tracing::info!(config = %source.display(), "using config");
    }
    Ok((config, source))
}

fn oracle_for(config: &RefactorConfig) -> TreeSitterOracle {
    TreeSitterOracle::new()
        .with_include_dirs(config.parse.include_dirs.iter().cloned())
        .with_max_include_depth(config.parse.max_include_depth)
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn cmd_implement_interface(
    config_path: Option<&Path>,
    file: &Path,
    line: usize,
    interface: &str,
    root: Option<PathBuf>,
    mode: OutputMode,
) -> Result<()> {
    let (config, config_source) = load_config(config_path, file)?;
    let text = read_source(file)?;

    let mut options = RefactorOptions::from_config(&config);
    if root.is_some() {
        options.search_root = root;
    }

    let guard = if mode.write {
        let guard = WorkspaceGuard::for_target(file, config_source.as_deref())?
            .excluding(config.search.exclude.iter().cloned());
        guard.check(file)?;
        Some(guard)
    } else {
        None
    };

    let patch = implement_interface(
        &oracle_for(&config),
        &WalkdirSearch::from_config(&config.search),
        ImplementInterfaceRequest {
            path: file,
            text: &text,
            line,
            interface,
        },
        &options,
    )
    .with_context(|| format!("cannot implement '{interface}' in {}", file.display()))?;

    if mode.json {
        println!("{}", serde_json::to_string_pretty(&patch)?);
    } else if mode.diff {
        display_diff(file, &text, &patch.patched);
    } else if !mode.write {
        print!("{}", patch.patched);
    }

    if let Some(guard) = guard {
        write_back(&guard, file, &text, &patch)?;
    }
    Ok(())
}

fn write_back(guard: &WorkspaceGuard, file: &Path, original: &str, patch: &Patch) -> Result<()> {
    // The file may have moved since the first check
    let target = guard.check(file)?;

    match write_patched(&target, original, &patch.patched)? {
        WriteResult::Written { file, bytes_added } => {
            eprintln!(
                "{} {} (+{} bytes)",
                "Patched".green().bold(),
                file.display(),
                bytes_added
            );
        }
        WriteResult::Unchanged { file } => {
            eprintln!("{} {}", "Unchanged".yellow(), file.display());
        }
    }
    Ok(())
}

fn cmd_generate_definitions(
    config_path: Option<&Path>,
    file: &Path,
    begin: usize,
    end: usize,
) -> Result<()> {
    let (config, _) = load_config(config_path, file)?;
    let text = read_source(file)?;

    let definitions = generate_definitions(
        &oracle_for(&config),
        GenerateDefinitionsRequest {
            path: file,
            text: &text,
            begin,
            end,
        },
    )
    .with_context(|| format!("cannot generate definitions for {}", file.display()))?;

    if definitions.is_empty() {
        eprintln!("{}", "No declarations without a definition in range".yellow());
    } else {
        print!("{definitions}");
    }
    Ok(())
}

fn cmd_show_config(config_path: Option<&Path>, path: Option<PathBuf>) -> Result<()> {
    let start = match path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let (config, source) = load_for(&start, config_path)?;
    match source {
        Some(source) => eprintln!("{} {}", "Config:".bold(), source.display()),
        None => eprintln!("{}", "No config file found, showing defaults".dimmed()),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{line}");
    }
}
