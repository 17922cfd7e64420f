// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use corbi_client::config::{Cli, ClientConfig};
use corbi_client::error::ClientError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = cli.config.validate() {
        eprintln!("error: {e}");
        return ExitCode::from(2);
    }

    init_tracing(&cli.config);
    let _ = rustls::crypto::ring::default_provider().install_default();

    match corbi_client::command::run(&cli.config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e:#}");
            match e.downcast_ref::<ClientError>() {
                Some(client_err) => ExitCode::from(client_err.code().exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(config: &ClientConfig) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}
