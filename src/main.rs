use log::{error, info};
use quote_rs::{
    config::{log_level, server::ServerConfig},
    server::run_server,
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

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("upstream {} (timeout {:?})", config.upstream_url, config.upstream_timeout);
    info!("database {:?} (timeout {:?})", config.db_path, config.db_timeout);

    match run_server(&config, shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("ctrl-c handler: {}", e);
        std::future::pending::<()>().await;
    }
}
