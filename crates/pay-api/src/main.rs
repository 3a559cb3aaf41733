//! # rzp-mcp
//!
//! Razorpay tool server with HTTP and stdio session transports.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//!
//! # HTTP transport on HOST:PORT (default)
//! rzp-mcp
//!
//! # JSON-RPC session on stdin/stdout
//! rzp-mcp --transport stdio
//! ```

use clap::{Parser, ValueEnum};
use pay_api::{routes, state::AppState, Session};
use tokio::io::BufReader;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Synchronous HTTP endpoint
    Http,
    /// Line-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// Both transports sharing one dispatcher
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "rzp-mcp")]
#[command(version, about = "Razorpay payment tools over HTTP and stdio")]
struct Cli {
    /// Transport binding to serve
    #[arg(short, long, value_enum, default_value = "http")]
    transport: Transport,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the session protocol; logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    info!("Environment: {}", state.config.environment);
    info!("Tools registered: {}", state.dispatcher.registry().len());
    info!("Transport: {:?}", cli.transport);

    match cli.transport {
        Transport::Http => serve_http(state).await,
        Transport::Stdio => serve_stdio(state).await,
        Transport::Both => {
            // Losing stdin must not take the HTTP listener down with it
            let session_state = state.clone();
            let stdio = async move {
                if let Err(e) = serve_stdio(session_state).await {
                    error!("Session transport failed: {:#}", e);
                }
                Ok::<(), anyhow::Error>(())
            };
            tokio::try_join!(serve_http(state), stdio)?;
            Ok(())
        }
    }
}

async fn serve_http(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();
    let app = routes::create_router(state);

    info!("HTTP transport starting on http://{}", addr);
    if !is_prod {
        info!("Catalog: GET http://{}/mcp/tools", addr);
        info!("Invoke: POST http://{}/mcp/request", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP transport stopped");
    Ok(())
}

async fn serve_stdio(state: AppState) -> anyhow::Result<()> {
    let session = Session::new(state.dispatcher);
    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

fn print_banner() {
    eprintln!(
        r#"
  Razorpay MCP Server
  ━━━━━━━━━━━━━━━━━━━━━━━
  Payment tools over HTTP and stdio
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
