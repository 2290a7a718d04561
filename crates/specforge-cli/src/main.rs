//! specforge CLI entrypoint
//! Parses command-line arguments and dispatches to the core library.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use specforge_core::{merge::merge_documents, Config, SourceApi, SpecParser};
use tokio::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the base document and fragments come from
#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Config file (YAML, JSON or TOML) naming the base spec and fragments
    #[arg(long, conflicts_with_all = ["spec", "fragments"])]
    config: Option<PathBuf>,
    /// Base OpenAPI document (YAML or JSON)
    #[arg(long, required_unless_present = "config")]
    spec: Option<PathBuf>,
    /// Fragment merged over the base; repeat to apply several in order
    #[arg(long = "fragment")]
    fragments: Vec<PathBuf>,
    /// Directory relative file references are resolved from
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Merge fragments over the base document and print the result
    Merge {
        #[command(flatten)]
        source: SourceArgs,
        /// Write the merged document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge, parse and validate every schema
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the classified schemas as JSON
    Schemas {
        #[command(flatten)]
        source: SourceArgs,
    },
}

impl SourceArgs {
    async fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match (&self.config, &self.spec) {
            (Some(path), _) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            (None, Some(spec)) => {
                let mut config = Config::new(spec);
                config.fragments = self.fragments.clone();
                config
            }
            (None, None) => anyhow::bail!("either --config or --spec is required"),
        };
        if self.base_dir.is_some() {
            config.base_dir = self.base_dir.clone();
        }
        Ok(config)
    }
}

async fn load_source(args: &SourceArgs) -> anyhow::Result<SourceApi> {
    let config = args.load_config().await?;
    let parser = SpecParser::new(config.parse_options());
    tracing::info!(
        "Loading {} with {} fragment(s)",
        config.base_spec.display(),
        config.fragments.len()
    );
    let source = SourceApi::from_config(&config, &parser).await?;
    Ok(source)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Merge { source, output } => {
            let config = source.load_config().await?;
            let base = fs::read_to_string(&config.base_spec)
                .await
                .with_context(|| format!("Failed to read {}", config.base_spec.display()))?;
            let mut fragments = Vec::new();
            for fragment in &config.fragments {
                fragments.push(
                    fs::read_to_string(fragment)
                        .await
                        .with_context(|| format!("Failed to read {}", fragment.display()))?,
                );
            }

            let merged = merge_documents(&base, &fragments)?;
            match output {
                Some(path) => {
                    fs::write(path, &merged)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote merged specification to {}", path.display());
                }
                None => print!("{}", merged),
            }
        }
        Commands::Validate { source } => {
            let api = load_source(source).await?;
            println!(
                "OK: '{}' {} with {} schemas",
                api.model().title(),
                api.model().version(),
                api.all_schemas().len()
            );
        }
        Commands::Schemas { source } => {
            let api = load_source(source).await?;
            println!("{}", serde_json::to_string_pretty(api.all_schemas())?);
        }
    }
    Ok(())
}
