use anyhow::{Context, Result};
use clap::Parser;
use songplays_etl::config::{AppConfig, CliConfig, Credentials, FileConfig};
use songplays_etl::{pipeline, ExecutionContext};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(name = "songplays-etl")]
#[command(about = "Build the songplays star schema from song metadata and activity logs")]
struct CliArgs {
    /// Root holding song_data/ and log_data/ (s3a://bucket/prefix or a local directory).
    #[arg(long)]
    pub input: Option<String>,

    /// Root the five output tables are written under.
    #[arg(long)]
    pub output: Option<String>,

    /// Path to the INI file with the [AWS] access keys.
    #[arg(long, value_parser = parse_path)]
    pub credentials: Option<PathBuf>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[arg(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            input_root: self.input.clone(),
            output_root: self.output.clone(),
            credentials_path: self.credentials.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "songplays-etl v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path).context("Failed to load config file")?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)
        .context("Invalid configuration")?;

    // The environment must be written while this is the only thread, so
    // credentials are exported before the runtime spawns its workers
    if let Some(path) = &config.credentials_path {
        info!("Loading credentials from {:?}", path);
        let credentials = Credentials::load(path).context("Failed to load credentials")?;
        credentials.export_to_env();
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?
        .block_on(run(config))
}

async fn run(config: AppConfig) -> Result<()> {
    let context = ExecutionContext::create(&config)
        .await
        .context("Failed to create execution context")?;

    pipeline::run(&context, &config.sources)
        .await
        .context("ETL run failed")?;

    Ok(())
}
