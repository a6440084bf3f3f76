use callisto::core::config;
use callisto::tui;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "callisto", about = "Terminal client for a multimodal chat backend")]
struct Args {
    /// Backend base URL (overrides config file and CALLISTO_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Config file to use instead of ~/.callisto/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config(args.config.as_deref()).map_err(|e| {
        eprintln!("callisto: {e}");
        std::io::Error::other(e.to_string())
    })?;
    let config = config::resolve(
        &file_config,
        args.base_url.as_deref(),
        args.log_level.as_deref(),
    );

    // File logger - the terminal belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    log::info!("Callisto starting up against {}", config.base_url);

    tui::run(config)
}
