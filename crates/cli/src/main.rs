mod config_commands;
mod demo;

use std::path::PathBuf;

use {
    anyhow::{Context, bail},
    async_graphql::{Request, Variables},
    clap::{Parser, Subcommand},
    schemagen_config::{EngineConfig, Severity, discover_and_load, load_config, validate_config},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "schemagen", about = "schemagen: GraphQL schemas from domain models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./schemagen.toml and friends).
    #[arg(long, global = true, env = "SCHEMAGEN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SDL of the demo catalog schema.
    Sdl,
    /// Execute a GraphQL document against the demo catalog.
    Query {
        /// The document, or `@path` to read it from a file.
        document: String,
        /// Variables as a JSON object.
        #[arg(long)]
        variables: Option<String>,
    },
    /// Validate the configuration file and report errors/warnings.
    CheckConfig {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn engine_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => discover_and_load(),
    };

    let diagnostics = validate_config(&config);
    for d in diagnostics.iter().filter(|d| d.severity == Severity::Warning) {
        warn!(path = %d.path, "{}", d.message);
    }
    if let Some(d) = diagnostics.iter().find(|d| d.severity == Severity::Error) {
        bail!("invalid config at {}: {} (run `schemagen check-config`)", d.path, d.message);
    }
    Ok(config)
}

fn read_document(document: String) -> anyhow::Result<String> {
    match document.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document from {path}")),
        None => Ok(document),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "schemagen starting");

    match cli.command {
        Commands::Sdl => {
            let schema = demo::schema(engine_config(&cli)?)?;
            println!("{}", schema.sdl());
            Ok(())
        },
        Commands::Query {
            ref document,
            ref variables,
        } => {
            let schema = demo::schema(engine_config(&cli)?)?;
            let mut request = Request::new(read_document(document.clone())?);
            if let Some(variables) = variables {
                let json = serde_json::from_str(variables).context("--variables is not valid JSON")?;
                request = request.variables(Variables::from_json(json));
            }
            let response = schema.execute(request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if response.is_err() {
                std::process::exit(2);
            }
            Ok(())
        },
        Commands::CheckConfig { verbose } => config_commands::check(cli.config.as_deref(), verbose),
    }
}
