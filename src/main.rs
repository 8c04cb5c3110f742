//! Command-line front end for tiktok-dl

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tiktok_dl::{BatchDownloader, Config, Error, Event, StrategyKind};
use tokio::io::AsyncReadExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tiktok-dl")]
#[command(version)]
#[command(about = "Download TikTok videos one at a time")]
#[command(long_about = "Download TikTok videos one at a time.\n\n\
    Paste URLs separated by spaces or newlines. Tokens that are not TikTok \
    links are ignored. Videos are saved to ~/Downloads/tiktok videos unless \
    --output-dir says otherwise.")]
struct Cli {
    /// TikTok URLs (space or newline separated; several arguments are joined)
    urls: Vec<String>,

    /// Read more URLs from a file ("-" reads stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Retrieval method: "api" (fast) or "ytdlp" (reliable); anything else means api
    #[arg(short, long, env = "TIKTOK_DL_METHOD", default_value = "api")]
    method: String,

    /// Directory videos are saved to
    #[arg(short, long, env = "TIKTOK_DL_DIR", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long, env = "TIKTOK_DL_YTDLP", value_name = "PATH")]
    ytdlp_path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, env = "TIKTOK_DL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pause between items for the api method, in milliseconds
    #[arg(long, value_name = "MS")]
    pacing_ms: Option<u64>,

    /// Give up on a single item after this many seconds (0 = never)
    #[arg(long, value_name = "SECS")]
    item_timeout_secs: Option<u64>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_config(&self) -> tiktok_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.download.download_dir = dir.clone();
        }
        if let Some(path) = &self.ytdlp_path {
            config.tool.ytdlp_path = Some(path.clone());
        }
        if let Some(ms) = self.pacing_ms {
            config.download.pacing_delay = Duration::from_millis(ms);
        }
        match self.item_timeout_secs {
            Some(0) => config.download.item_timeout = None,
            Some(secs) => config.download.item_timeout = Some(Duration::from_secs(secs)),
            None => {}
        }

        Ok(config)
    }

    async fn raw_input(&self) -> tiktok_dl::Result<String> {
        let mut raw = self.urls.join("\n");

        if let Some(path) = &self.input {
            let text = if path.as_os_str() == "-" {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await?;
                buf
            } else {
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    std::io::Error::new(
                        e.kind(),
                        format!("Failed to read '{}': {}", path.display(), e),
                    )
                })?
            };
            raw.push('\n');
            raw.push_str(&text);
        }

        Ok(raw)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print progress lines until the batch reports completion
async fn print_progress(mut events: broadcast::Receiver<Event>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "progress output lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match event {
            Event::BatchStarted { total, strategy } => {
                println!("Found {total} URL(s)");
                println!("Method: {}", strategy.label());
                println!("Downloading one at a time...\n");
            }
            Event::ItemStarted { index, total, url } => {
                println!("[{}/{}]", index + 1, total);
                println!("Fetching: {url}");
            }
            Event::ItemSucceeded { filename, .. } => {
                println!("Downloaded: {filename}");
            }
            Event::ItemFailed { reason, .. } => {
                eprintln!("Failed: {reason}");
            }
            Event::Pacing { .. } => {}
            Event::BatchCancelled { dispatched } => {
                println!("\nCancelled after {dispatched} item(s)");
            }
            Event::BatchFinished { result } => {
                println!(
                    "\nDone! {} success, {} failed",
                    result.success_count, result.fail_count
                );
                break;
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::warn!(error = %e, "Could not register any signal handlers");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Drive `work` while watching for interrupts
///
/// The first signal cancels `token` so the batch stops before its next item.
/// A second signal drops `work` (killing a running yt-dlp child and removing
/// any partial file) and returns `Error::Cancelled`.
async fn until_interrupted<T, W, S, F>(
    work: W,
    token: CancellationToken,
    mut next_signal: S,
) -> tiktok_dl::Result<T>
where
    W: Future<Output = tiktok_dl::Result<T>>,
    S: FnMut() -> F,
    F: Future<Output = ()>,
{
    tokio::pin!(work);

    tokio::select! {
        outcome = &mut work => return outcome,
        () = next_signal() => {
            tracing::warn!("Stopping after the current item, interrupt again to abort it");
            token.cancel();
        }
    }

    tokio::select! {
        outcome = &mut work => outcome,
        () = next_signal() => {
            tracing::warn!("Aborting the item in flight");
            Err(Error::Cancelled)
        }
    }
}

async fn run(cli: Cli) -> tiktok_dl::Result<()> {
    let config = cli.load_config()?;
    let kind = StrategyKind::from_selector(&cli.method);
    let raw = cli.raw_input().await?;

    let downloader = BatchDownloader::new(config, kind).await?;
    let printer = tokio::spawn(print_progress(downloader.subscribe()));

    let outcome = until_interrupted(
        downloader.run(&raw),
        downloader.cancellation_token(),
        wait_for_signal,
    )
    .await;

    // Closing the channel lets the printer finish even if the batch never started
    drop(downloader);
    printer.await.ok();

    outcome.map(|_| ())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "batch aborted");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
