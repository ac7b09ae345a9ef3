use log::error;
use quote_rs::{
    client,
    config::{client::ClientConfig, log_level},
};
use simple_logger::SimpleLogger;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let level = match log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = SimpleLogger::new().with_colors(true).with_level(level).init() {
        eprintln!("logger init: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match client::run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
