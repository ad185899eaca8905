use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use exercise_report::{ExerciseStore, ReportConfig, ReportGenerator};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Serves exercise-log PDF reports at `GET /api/download-pdf`.
///
/// Fonts must be present under `assets/fonts` next to the binary or the library manifest, or be
/// provided through `--fonts-dir` / `EXERCISE_REPORT_FONTS_DIR`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "HTTP server rendering exercise reports as PDF"
)]
struct Args {
    /// SQLite connection string of the exercise store.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://exercise.db?mode=rwc"
    )]
    database_url: String,

    /// Socket address to listen on.
    #[arg(long, env = "EXERCISE_REPORT_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory containing the Roboto font family.
    #[arg(long, env = "EXERCISE_REPORT_FONTS_DIR")]
    fonts_dir: Option<PathBuf>,

    /// Maximum number of pooled database connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Create the `exercise` table when it does not exist.
    #[arg(long)]
    init_schema: bool,

    /// Skip the per-exercise outline entries.
    #[arg(long)]
    no_bookmarks: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(Args::parse()).await {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let store = ExerciseStore::connect(&args.database_url, args.max_connections).await?;
    if args.init_schema {
        store.ensure_schema().await?;
        info!("ensured exercise schema");
    }

    let mut config = ReportConfig::default().with_fonts_dir(args.fonts_dir);
    config.bookmarks = !args.no_bookmarks;
    if !exercise_report::fonts::default_fonts_available(config.fonts_dir.as_deref()) {
        tracing::warn!("report fonts not found; downloads will fail until they are installed");
    }

    let app = exercise_report::http::router(ReportGenerator::new(store, config));
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(address = %args.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
