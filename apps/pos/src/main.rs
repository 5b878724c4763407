//! # Teahouse POS Entry Point
//!
//! ```text
//! teahouse-pos quote <order.json>    price an order, print the cart as JSON
//! teahouse-pos session               restore the saved session, print it
//! ```
//!
//! The UI host links `teahouse_pos_lib` directly; this binary is for
//! checking prices and sessions from a terminal.

use std::env;
use std::fs;

use anyhow::{bail, Context};
use teahouse_pos_lib::commands::quote::{quote_order, QuoteRequest};
use teahouse_pos_lib::commands::session::get_session;
use teahouse_pos_lib::state::PosConfig;
use teahouse_pos_lib::{init_tracing, PosApp};
use tracing::info;

const USAGE: &str = "usage: teahouse-pos quote <order.json> | teahouse-pos session";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("quote") => {
            let path = args.get(1).context(USAGE)?;
            quote(path)
        }
        Some("session") => session(),
        _ => bail!(USAGE),
    }
}

fn quote(path: &str) -> anyhow::Result<()> {
    let config = PosConfig::from_env().context("Failed to load configuration")?;

    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let request: QuoteRequest =
        serde_json::from_str(&raw).with_context(|| format!("Invalid order in {}", path))?;

    let response = quote_order(request)?;
    info!(
        lines = response.lines.len(),
        total = %config.format_currency(response.totals.total),
        "Order priced"
    );

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn session() -> anyhow::Result<()> {
    let app = PosApp::from_env()?;
    app.restore();

    println!("{}", serde_json::to_string_pretty(&get_session(&app.auth))?);
    Ok(())
}
