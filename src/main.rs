use clap::Parser;
use oracle_keeper::cli::{Cli, Commands};
use oracle_keeper::config::Config;
use oracle_keeper::error::ConfigError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load configuration; a missing file falls back to the bundled example
    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(ConfigError::Read { path, source }) if source.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("Warning: {} not found, using default configuration", path.display());
            Config::from_toml(include_str!("../config.toml.example"))?
        }
        Err(e) => return Err(e.into()),
    };
    config.apply_env();

    // Initialize telemetry
    let _telemetry = oracle_keeper::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(mode = ?config.execution.mode, "Starting oracle keeper");
            args.execute(&config).await?;
        }
        Commands::Check(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
