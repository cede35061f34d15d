//! QuillSign - send documents for signature from the desktop
//!
//! Headless entry point: reads commands from stdin and accepts a login
//! callback URL on the command line when launched through the custom scheme.

use std::sync::Arc;

use anyhow::Context as _;
use quillsign_common::auth::find_protocol_url;
use quillsign_domain::{EnvelopeResult, Recipient};
use quillsign_lib::{
    cancel_login, handle_redirect, logout, send_envelope, session_status, start_login,
    AppContext, SessionInfo,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const HELP: &str = "commands: login | cancel | url <callback-url> | \
send <email> <country-code> <number> <name...> | status | logout | quit";

fn wants_json_logs() -> bool {
    std::env::var("QUILLSIGN_LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if wants_json_logs() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

fn print_session(session: Option<SessionInfo>) {
    match session {
        Some(session) => println!(
            "logged in as {} <{}> on {} ({}), until {}",
            session.display_name,
            session.email,
            session.account_name,
            session.external_account_id.as_deref().unwrap_or("no account number"),
            session.expires_at.to_rfc3339()
        ),
        None => println!("not logged in"),
    }
}

fn print_result(result: &EnvelopeResult) {
    match result {
        EnvelopeResult::Success { envelope_id, .. } => println!("envelope sent: {envelope_id}"),
        EnvelopeResult::Failure { error_message, .. } => println!("send failed: {error_message}"),
    }
    let diagnostics = result.diagnostics();
    if let Some(remaining) = diagnostics.available_api_requests {
        println!("API requests remaining: {remaining}");
    }
    if let Some(reset) = diagnostics.api_requests_reset_at {
        println!("API limit resets at: {}", reset.to_rfc3339());
    }
    if let Some(trace_id) = &diagnostics.trace_id {
        println!("trace id: {trace_id}");
    }
}

fn parse_recipient(args: &[&str]) -> Option<Recipient> {
    match args {
        [email, country_code, number, name @ ..] if !name.is_empty() => Some(Recipient {
            email: (*email).to_string(),
            name: name.join(" "),
            sms_country_code: (*country_code).to_string(),
            sms_number: (*number).to_string(),
        }),
        _ => None,
    }
}

/// Run one command line; returns `false` to quit.
async fn run_command(ctx: &AppContext, line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((command, args)) = words.split_first() else {
        return true;
    };

    match *command {
        "login" => match start_login(ctx).await {
            Ok(None) => println!("complete the login in your browser"),
            Ok(session) => print_session(session),
            Err(err) => println!("login failed: {err}"),
        },
        "cancel" => cancel_login(ctx).await,
        "url" => match args.first() {
            Some(raw) => match handle_redirect(ctx, raw).await {
                Ok(None) => println!("ignored: not a login callback"),
                Ok(session) => print_session(session),
                Err(err) => println!("login failed: {err}"),
            },
            None => println!("usage: url <callback-url>"),
        },
        "send" => match parse_recipient(args) {
            Some(recipient) => match send_envelope(ctx, recipient).await {
                Ok(result) => print_result(&result),
                Err(err) => println!("{err}"),
            },
            None => println!("usage: send <email> <country-code> <number> <name...>"),
        },
        "status" => {
            print_session(session_status(ctx).await);
            if let Some(country) = ctx.default_country() {
                println!("default country: {country}");
            }
        }
        "logout" => {
            logout(ctx).await;
            println!("logged out");
        }
        "quit" | "exit" => return false,
        _ => println!("{HELP}"),
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may set RUST_LOG or QUILLSIGN_LOG_FORMAT, so it is read before the
    // subscriber is installed and reported after.
    let dotenv = dotenvy::dotenv();
    init_tracing();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let ctx = Arc::new(AppContext::new().context("failed to initialise QuillSign")?);
    tracing::info!("QuillSign starting...");

    let geo_ctx = Arc::clone(&ctx);
    tokio::spawn(async move { geo_ctx.refresh_default_country().await });

    let args: Vec<String> = std::env::args().collect();
    let schemes = [ctx.login.config().scheme_prefix()];
    if let Some(url) = find_protocol_url(&args, &schemes) {
        match handle_redirect(&ctx, &url).await {
            Ok(session) => print_session(session),
            Err(err) => println!("login failed: {err}"),
        }
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if !run_command(&ctx, &line).await {
            break;
        }
    }

    ctx.login.close_window().await;
    tracing::info!("QuillSign stopped");
    Ok(())
}
