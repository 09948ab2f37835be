use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use tern::api::client::DeepSeekClient;
use tern::core::config;
use tern::tui;

#[derive(Parser)]
#[command(name = "tern", version, about = "Terminal chat client for the DeepSeek API")]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    Args::parse();
    dotenv::dotenv().ok();

    // Debug logger is opt-in: TERN_DEBUG=1 writes to tern.log
    // (path override via TERN_DEBUG_LOG)
    init_debug_log();

    let config = match config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("tern: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Tern starting up with model: {}", config.model.id());

    let backend = Arc::new(DeepSeekClient::new(
        config.api_key.clone(),
        config.base_url.clone(),
    ));

    match tui::run(backend, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tern: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_debug_log() {
    if std::env::var("TERN_DEBUG").as_deref() != Ok("1") {
        return;
    }
    let path = std::env::var("TERN_DEBUG_LOG").unwrap_or_else(|_| "tern.log".to_string());
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&path) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
}
