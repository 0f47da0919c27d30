use std::path::PathBuf;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use huddle_web::http::{start_server, WebState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the built web console
    #[arg(long, env = "HUDDLE_DIST", default_value = "dist")]
    dist: PathBuf,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    if !args.dist.join("index.html").is_file() {
        eprintln!(
            "No index.html under {}; build the web console first",
            args.dist.display()
        );
        std::process::exit(1);
    }

    // The same variable the frontend build reads; here it is deferred to
    // serve time so one image works across deployments.
    let api_base_url = std::env::var("VITE_API_BASE_URL").unwrap_or_default();

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let addr = format!("{}:{}", args.host, args.port);
    let state = WebState {
        api_base_url,
        dist_dir: args.dist,
    };
    start_server(&addr, state, tx.subscribe()).await?;

    Ok(())
}
