//! vsdl-server - reference server for verifiable selective-disclosure
//! delegation tokens.
//!
//! usage:
//!   vsdl-server --port 8787
//!
//! Exposes Issue/Dispense/Verify (spec §4.5, §6.3) plus two read-only
//! diagnostics endpoints over an in-memory record and policy catalog
//! (spec §6.4: no persistence is required).

use clap::Parser;
use rand::RngCore;
use tracing::info;

use vsdl_server::{catalog, ServerState};

/// vsdl-server - issue, dispense, and verify selective-disclosure tokens
#[derive(Parser)]
#[command(name = "vsdl-server")]
#[command(about = "reference server for verifiable selective-disclosure delegation tokens")]
#[command(version)]
struct Args {
    /// port to listen on
    #[arg(short, long, default_value = "8787")]
    port: u16,

    /// bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vsdl_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    // server secret generated fresh at startup; key rotation out of scope
    // (spec §6.2).
    let mut secret = vec![0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut secret);

    let mut state = ServerState::new(secret);
    catalog::seed(&mut state);
    info!("seeded {} record(s), {} polic(ies)", state.records.len(), state.policies.len());

    let app = vsdl_server::app(state);

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.expect("failed to bind listen address");
    info!("vsdl-server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app).await.expect("server exited unexpectedly");
}
