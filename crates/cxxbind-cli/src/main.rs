use clap::{Parser, Subcommand};
use cxxbind_common::Diagnostic;
use cxxbind_config::BindConfig;
use cxxbind_core::{PreprocessOptions, PreprocessResult, Preprocessor};
use cxxbind_model::{ingest, RawTree};
use cxxbind_types::TypeResolver;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "cxxbind")]
#[command(author, version, about = "Prepare C/C++ header declarations for binding generation")]
struct Cli {
    /// Log every filtered symbol and wrapper application
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pass over a symbol tree and report unsupported functions
    Process {
        /// Symbol tree produced by the header front-end (JSON)
        tree: PathBuf,

        /// Binding configuration (cxxbind.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also print the external signature of every generated function
        #[arg(long)]
        summary: bool,
    },

    /// Show how type spellings resolve against a symbol tree
    Types {
        /// Symbol tree produced by the header front-end (JSON)
        tree: PathBuf,

        /// Type spellings to resolve
        #[arg(required = true)]
        spellings: Vec<String>,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Configuration file to check
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,cxxbind=debug"
    } else {
        "warn,cxxbind=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).init();
}

fn load_tree(path: &Path) -> Result<RawTree> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    Ok(RawTree::from_json(&text)?)
}

fn load_options(config: Option<&Path>) -> Result<PreprocessOptions> {
    let Some(path) = config else {
        return Ok(PreprocessOptions::default());
    };
    let config = BindConfig::from_file(path)?;
    config.validate()?;
    tracing::info!("using configuration for {}", config.project.name);
    Ok(PreprocessOptions::try_from(&config)?)
}

fn preprocess(tree: &Path, options: PreprocessOptions) -> Result<PreprocessResult> {
    let ingested = ingest(load_tree(tree)?);
    Ok(Preprocessor::new(options).process(ingested)?)
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.render());
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Process {
            tree,
            config,
            summary,
        } => {
            let options = load_options(config.as_deref())?;
            let result = preprocess(&tree, options)?;

            report(&result.diagnostics);
            report(&result.unresolved_type_diagnostics());
            print!("{}", result.unsupported_report());
            if summary {
                print!("{}", result.summary());
            }
        }

        Commands::Types { tree, spellings } => {
            let result = preprocess(&tree, PreprocessOptions::default())?;
            let resolver = TypeResolver::new(&result.objects);

            for spelling in &spellings {
                let basic = resolver.resolve_to_basic_type(spelling);
                let supported = if resolver.is_type_supported(spelling) {
                    "yes"
                } else {
                    "no"
                };
                println!("{}", spelling);
                println!("  basic:     {}", basic);
                println!("  supported: {}", supported);
                println!("  host:      {}", resolver.cpp_type_to_host(spelling));
            }
        }

        Commands::CheckConfig { file } => {
            let config = BindConfig::from_file(&file)?;
            config.validate()?;
            PreprocessOptions::try_from(&config)?;
            println!("{}: OK (project {})", file.display(), config.project.name);
        }
    }

    Ok(())
}
