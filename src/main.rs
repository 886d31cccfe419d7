// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! hostjar CLI - HTTP requests with cookies remembered per host
//!
//! Cookies are kept as JSON files in `$HOSTJAR_COOKIE_DIR` (default
//! `./.hostjar`), so consecutive invocations share a session.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use hostjar::http::headers;
use hostjar::{BodyEncoding, CookieStore, FileStore, Method, Session, SessionConfig};

const DEFAULT_COOKIE_DIR: &str = ".hostjar";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hostjar=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "get" | "head" | "post" | "put" | "patch" | "delete" => {
            send(&args[1], &args[2..]).await
        }
        "cookies" => show_cookies(&args[2..]).await,
        "clear-cookies" => clear_cookies(&args[2..]).await,
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("hostjar {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"hostjar - HTTP requests with per-host cookie sessions

USAGE:
    hostjar <COMMAND> [OPTIONS]

COMMANDS:
    get|head|post|put|patch|delete <url> [OPTIONS]
                           Send a request, storing any cookies the host sets
    cookies <host>         Show cookies stored for a host
    clear-cookies <host>   Forget cookies stored for a host
    help                   Show this help message
    version                Show version information

REQUEST OPTIONS:
    -H, --header <name:value>   Add a header (repeatable)
    -q, --query <key=value>     Add a query parameter (repeatable)
    -p, --port <port>           Override the URL port
    -d, --data <text>           Send a raw body
    -j, --json <json>           Send a JSON body
    --form                      Encode --data as form (default)
    --text                      Encode --data as text/plain
    -t, --timeout <secs>        Per-call timeout (default 10)
    --no-cookies                Do not store response cookies
    --insecure                  Skip TLS certificate verification

ENVIRONMENT:
    HOSTJAR_COOKIE_DIR          Cookie directory (default ./.hostjar)
    RUST_LOG                    Log filter, e.g. hostjar=debug

EXAMPLES:
    hostjar post https://example.com/login -j '{{"user":"kalle"}}'
    hostjar get https://example.com/profile -q tab=settings
    hostjar cookies example.com
"#
    );
}

fn cookie_store() -> CookieStore {
    let dir = env::var("HOSTJAR_COOKIE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_COOKIE_DIR));
    CookieStore::new(Arc::new(FileStore::new(dir)))
}

fn session() -> anyhow::Result<Session> {
    Ok(Session::with_config(SessionConfig::default())?.with_cookie_store(cookie_store()))
}

fn take_value<'a>(
    flag: &str,
    iter: &mut impl Iterator<Item = &'a String>,
) -> anyhow::Result<&'a String> {
    iter.next()
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_timeout(raw: &str) -> anyhow::Result<Duration> {
    let secs = raw.parse::<f64>().context("invalid timeout")?;
    Duration::try_from_secs_f64(secs).context("invalid timeout")
}

async fn send(verb: &str, args: &[String]) -> anyhow::Result<ExitCode> {
    let Some(url) = args.first() else {
        bail!("Usage: hostjar {} <url> [OPTIONS]", verb);
    };

    let method: Method = verb.to_uppercase().parse().context("invalid method")?;
    let session = session()?;
    session.on_error(|event| {
        eprintln!(
            "! {} {} answered {}",
            event.method, event.hostname, event.response.status
        );
        Ok(())
    });

    let mut builder = session.request(method, url.as_str());
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-H" | "--header" => {
                let raw = take_value(arg, &mut iter)?;
                let (name, value) = raw
                    .split_once(':')
                    .ok_or_else(|| anyhow!("header must be name:value, got '{}'", raw))?;
                builder = builder.header(name.trim(), value.trim());
            }
            "-q" | "--query" => {
                let raw = take_value(arg, &mut iter)?;
                let (key, value) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow!("query must be key=value, got '{}'", raw))?;
                builder = builder.query(key, value);
            }
            "-p" | "--port" => {
                let port = take_value(arg, &mut iter)?
                    .parse::<u16>()
                    .context("invalid port")?;
                builder = builder.port(port);
            }
            "-d" | "--data" => {
                builder = builder.body(take_value(arg, &mut iter)?.as_str());
            }
            "-j" | "--json" => {
                let value: serde_json::Value =
                    serde_json::from_str(take_value(arg, &mut iter)?).context("invalid JSON")?;
                builder = builder.json_value(value);
            }
            "--form" => builder = builder.body_encoding(BodyEncoding::FormUrlEncoded),
            "--text" => builder = builder.body_encoding(BodyEncoding::PlainText),
            "-t" | "--timeout" => {
                builder = builder.timeout(parse_timeout(take_value(arg, &mut iter)?)?);
            }
            "--no-cookies" => builder = builder.persist_cookies(false),
            "--insecure" => builder = builder.verify(false),
            other => bail!("Unknown option: {}", other),
        }
    }

    let response = builder.send().await?;

    println!("Status: {}", response.status);
    println!("URL: {}", response.url);
    if let Some(content_type) = response.header(headers::CONTENT_TYPE) {
        println!("Content-Type: {}", content_type);
    }
    for cookie in response.header_all(headers::SET_COOKIE) {
        println!("Set-Cookie: {}", cookie);
    }
    println!("Size: {} bytes", response.body_len());
    println!("Time: {}ms", response.response_time_ms);

    if !response.body.is_empty() {
        println!();
        println!("{}", response.text_lossy());
    }

    Ok(if response.has_error() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

async fn show_cookies(args: &[String]) -> anyhow::Result<ExitCode> {
    let Some(host) = args.first() else {
        bail!("Usage: hostjar cookies <host>");
    };

    let jar = cookie_store().get(host).await?;
    if jar.is_empty() {
        println!("No cookies stored for {}", host);
        return Ok(ExitCode::SUCCESS);
    }

    println!("=== Cookies for {} ({}) ===", host, jar.len());
    for cookie in jar.iter() {
        let mut flags = Vec::new();
        if let Some(ref path) = cookie.path {
            flags.push(format!("path={}", path));
        }
        if let Some(expires) = cookie.expires {
            flags.push(format!("expires={}", expires.to_rfc2822()));
        }
        if cookie.secure {
            flags.push("secure".to_string());
        }
        if cookie.http_only {
            flags.push("httponly".to_string());
        }
        println!("  {}={}  {}", cookie.name, cookie.value, flags.join(" "));
    }
    Ok(ExitCode::SUCCESS)
}

async fn clear_cookies(args: &[String]) -> anyhow::Result<ExitCode> {
    let Some(host) = args.first() else {
        bail!("Usage: hostjar clear-cookies <host>");
    };

    cookie_store().clear(host).await?;
    println!("Cleared cookies for {}", host);
    Ok(ExitCode::SUCCESS)
}
