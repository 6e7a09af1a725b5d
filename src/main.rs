use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsync::cli::Overrides;
use docsync::cli::commands::document::DocumentOptions;
use docsync::cli::commands::verify::VerifyOptions;

#[derive(Parser)]
#[command(name = "docsync")]
#[command(
    version,
    about = "LLM-generated source documentation, kept in sync with the code"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

/// Source and provider overrides shared by commands that read files
#[derive(clap::Args, Clone, Default)]
struct SourceArgs {
    #[arg(long, help = "Local source root (default: source.root)")]
    root: Option<PathBuf>,
    #[arg(long, help = "GitHub repository as owner/repo")]
    repo: Option<String>,
    #[arg(long, help = "GitHub branch, tag or commit")]
    branch: Option<String>,
    #[arg(long, help = "LLM provider (claude-code, openai, ollama)")]
    provider: Option<String>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
}

impl From<SourceArgs> for Overrides {
    fn from(args: SourceArgs) -> Self {
        Overrides {
            root: args.root,
            repository: args.repo,
            branch: args.branch,
            provider: args.provider,
            model: args.model,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documentation for source files
    Document {
        #[arg(help = "Paths relative to the source root")]
        paths: Vec<String>,
        #[arg(long, conflicts_with = "paths", help = "Document every matching file")]
        all: bool,
        #[arg(long, help = "Two-letter target language (default: documentation.default_language)")]
        lang: Option<String>,
        #[arg(long, help = "Print documents as JSON")]
        json: bool,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Verify a file's code examples against its source
    Verify {
        #[arg(help = "Path relative to the source root")]
        path: String,
        #[arg(long, help = "Apply the suggested fix if verification fails")]
        apply_fix: bool,
        #[arg(long, help = "Print the result as JSON")]
        json: bool,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Parse a saved LLM response and show the resulting document
    Parse {
        #[arg(help = "Response file (reads stdin when omitted)")]
        file: Option<PathBuf>,
        #[arg(long, help = "File name used when the response has none")]
        name: Option<String>,
    },

    /// List documentable files of the source
    List {
        #[arg(long, help = "Print as JSON")]
        json: bool,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocsync encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // RUST_BACKTRACE=1 still prints a backtrace
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Document {
            paths,
            all,
            lang,
            json,
            source,
        } => {
            let report = docsync::cli::commands::document::run(DocumentOptions {
                paths,
                all,
                language: lang,
                json,
                quiet: cli.quiet,
                overrides: source.into(),
            })?;
            if report.failed > 0 {
                anyhow::bail!("{} file(s) could not be documented", report.failed);
            }
        }
        Commands::Verify {
            path,
            apply_fix,
            json,
            source,
        } => {
            let report = docsync::cli::commands::verify::run(VerifyOptions {
                path,
                apply_fix,
                json,
                quiet: cli.quiet,
                overrides: source.into(),
            })?;
            if report.is_failure() {
                anyhow::bail!("verification failed for {}", report.path);
            }
        }
        Commands::Parse { file, name } => {
            docsync::cli::commands::parse::run(file.as_deref(), name.as_deref())?;
        }
        Commands::List { json, source } => {
            docsync::cli::commands::list::run(&Overrides::from(source), json)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                docsync::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                docsync::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                docsync::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
