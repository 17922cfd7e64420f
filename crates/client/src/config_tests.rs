// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use super::*;

fn parse(args: &[&str]) -> anyhow::Result<Cli> {
    let argv = std::iter::once("corbi").chain(args.iter().copied());
    Ok(Cli::try_parse_from(argv)?)
}

fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        vars.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn defaults_are_valid() -> anyhow::Result<()> {
    let cli = parse(&["status"])?;
    cli.config.validate()?;
    assert_eq!(cli.config.timeout(), Duration::from_secs(30));
    assert_eq!(cli.config.login_path, "/login");
    assert!(matches!(cli.command, Command::Status));
    Ok(())
}

#[yare::parameterized(
    not_http = { &["--api-url", "ftp://example.test", "status"] },
    zero_timeout = { &["--timeout-ms", "0", "status"] },
    absolute_login = { &["--login-path", "https://evil.example/login", "status"] },
    bad_log_format = { &["--log-format", "xml", "status"] },
)]
fn validate_rejects(args: &[&str]) {
    let parsed = parse(args);
    assert!(parsed.is_ok_and(|cli| cli.config.validate().is_err()));
}

#[test]
fn request_command_parses() -> anyhow::Result<()> {
    let cli = parse(&["request", "post", "/outbound/", "--data", r#"{"body":"hi"}"#])?;
    let Command::Request { method, path, data } = cli.command else {
        anyhow::bail!("expected request command");
    };
    assert_eq!(method, "post");
    assert_eq!(path, "/outbound/");
    assert_eq!(data.as_deref(), Some(r#"{"body":"hi"}"#));
    Ok(())
}

#[test]
fn endpoints_follow_login_path() -> anyhow::Result<()> {
    let cli = parse(&["--login-path", "/signin", "status"])?;
    let endpoints = cli.config.endpoints();
    assert_eq!(endpoints.login_page, "/signin");
    assert_eq!(endpoints.renewal, "/auth/token/refresh/");
    assert_eq!(endpoints.login, "/auth/token/");
    Ok(())
}

#[test]
fn explicit_state_dir_wins() -> anyhow::Result<()> {
    let cli = parse(&["--state-dir", "/tmp/corbi-explicit", "status"])?;
    assert_eq!(cli.config.state_dir(), PathBuf::from("/tmp/corbi-explicit"));
    Ok(())
}

#[yare::parameterized(
    explicit = { &[("CORBI_STATE_DIR", "/srv/corbi"), ("XDG_STATE_HOME", "/x"), ("HOME", "/h")], "/srv/corbi" },
    xdg = { &[("XDG_STATE_HOME", "/x"), ("HOME", "/h")], "/x/corbi" },
    home = { &[("HOME", "/h")], "/h/.local/state/corbi" },
    empty_values_skipped = { &[("CORBI_STATE_DIR", ""), ("XDG_STATE_HOME", ""), ("HOME", "/h")], "/h/.local/state/corbi" },
    nothing = { &[], ".corbi" },
)]
fn state_dir_resolution(vars: &[(&str, &str)], expected: &str) {
    assert_eq!(state_dir_with(env_from(vars)), PathBuf::from(expected));
}

#[test]
#[serial_test::serial]
fn state_dir_reads_process_env() {
    std::env::set_var("CORBI_STATE_DIR", "/tmp/corbi-from-env");
    let resolved = default_state_dir();
    std::env::remove_var("CORBI_STATE_DIR");
    assert_eq!(resolved, PathBuf::from("/tmp/corbi-from-env"));
}
