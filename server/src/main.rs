use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use sketchpad_shared::SIGNAL_FRESHNESS_MS;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

mod handlers;
mod logic;
mod state;

use crate::handlers::{ping_handler, ws_handler};
use crate::state::AppState;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding index.html and the wasm bundle.
    #[arg(long)]
    public_dir: Option<PathBuf>,
    /// How long a sent signal stays deliverable.
    #[arg(long, default_value_t = SIGNAL_FRESHNESS_MS)]
    freshness_ms: u64,
}

const DEFAULT_LOG_FILTER: &str = "info";

fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn app(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/ws/signal", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let args = Args::parse();
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let state = AppState::new(args.freshness_ms);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    tracing::info!(%port, public_dir = %public_dir.display(), freshness_ms = args.freshness_ms, "sketchpad listening");
    axum::serve(listener, app(state, public_dir))
        .await
        .expect("Server crashed");
}
