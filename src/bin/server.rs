use std::fs::OpenOptions;
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use log::info;

use pixframe::config::ServerConfig;
use pixframe::server::{fetch, http};

#[derive(Parser, Debug)]
#[clap(name = "pixframe-server")]
#[clap(
    about = "Fetch, rescale and re-serve an upstream image for a pixframe device",
    long_about = None
)]
struct Cli {
    /// Path to the JSON configuration file
    #[clap(long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Invalid or missing configuration is fatal; nothing starts half-set-up.
    let config = ServerConfig::load(&cli.config)?;
    init_logging(&config);

    let fetcher_config = config.clone();
    thread::spawn(move || fetch::run_refresh_loop(&fetcher_config));

    info!("pixframe server starting");
    http::serve(&config).await?;
    Ok(())
}

fn init_logging(config: &ServerConfig) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );
    match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.paths.log_file)
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!(
            "cannot open log file {}: {e}; logging to stderr",
            config.paths.log_file.display()
        ),
    }
    builder.init();
}
