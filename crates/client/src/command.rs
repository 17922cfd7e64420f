// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `corbi` subcommands.

use std::sync::Arc;

use reqwest::Method;

use crate::auth::ConsoleNavigator;
use crate::config::{ClientConfig, Command};
use crate::pipeline::ApiClient;
use crate::transport::RequestEnvelope;

/// Run one subcommand to completion.
pub async fn run(config: &ClientConfig, command: Command) -> anyhow::Result<()> {
    let location = match command {
        Command::Request { ref path, .. } => path.clone(),
        _ => "/".to_owned(),
    };
    let client = crate::build_client(config, Arc::new(ConsoleNavigator::new(location)))?;
    dispatch(&client, command).await
}

pub async fn dispatch(client: &ApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            print_json(&serde_json::to_value(client.session().read().summary())?)
        }
        Command::Logout => {
            client.logout();
            Ok(())
        }
        Command::Org { id } => {
            client.select_tenant(id);
            Ok(())
        }
        Command::Memberships => {
            let memberships = client.memberships().await?;
            print_json(&serde_json::to_value(memberships)?)
        }
        Command::Status => print_json(&serde_json::to_value(client.session().read().summary())?),
        Command::Request { method, path, data } => {
            let envelope = build_envelope(&method, path, data.as_deref())?;
            let response = client.execute(envelope).await?;
            match response.json::<serde_json::Value>() {
                Ok(value) => print_json(&value),
                Err(_) => {
                    println!("{}", response.text());
                    Ok(())
                }
            }
        }
    }
}

/// Parse CLI request arguments into an envelope.
pub fn build_envelope(
    method: &str,
    path: String,
    data: Option<&str>,
) -> anyhow::Result<RequestEnvelope> {
    let method: Method = method
        .to_uppercase()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid HTTP method: {method}"))?;
    let mut envelope = RequestEnvelope::new(method, path);
    if let Some(raw) = data {
        let body: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--data is not JSON: {e}"))?;
        envelope = envelope.with_body(body);
    }
    Ok(envelope)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
