use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::Level;

use tagwatch::config::{Config, DEFAULT_CONFIG_PATH};
use tagwatch::logging::{LogFormat, init_logging};
use tagwatch::report::{OutputFormat, render};
use tagwatch::scheduler::NomadClient;
use tagwatch::version::registries::OciRegistry;

#[derive(Parser)]
#[command(name = "tagwatch")]
#[command(
    version,
    about = "Report running Nomad tasks whose container image has a newer tag"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "TAGWATCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Nomad ACL token, overrides the config file
    #[arg(long, env = "NOMAD_TOKEN", hide_env_values = true)]
    nomad_token: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_level, cli.log_format, cli.log_file.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(token) = cli.nomad_token {
        config.token = Some(token);
    }

    let client = config.http.build_client()?;
    let registry = Arc::new(OciRegistry::new(client.clone()));
    let scheduler = NomadClient::new(client, &config.server, config.token.clone());

    let rows = tagwatch::app::run(&config, registry, &scheduler)
        .await
        .inspect_err(|e| tracing::error!("{:#}", e))?;

    println!("{}", render(&rows, cli.output)?);
    Ok(())
}
