//! Basic batch example
//!
//! This example demonstrates the core functionality of tiktok-dl:
//! - Configuring the download directory and pacing
//! - Creating a downloader instance
//! - Subscribing to events
//! - Running a batch and reading the result

use std::time::Duration;
use tiktok_dl::config::{Config, DownloadConfig};
use tiktok_dl::{BatchDownloader, Event, StrategyKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Build configuration
    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads/tiktok videos".into(),
            pacing_delay: Duration::from_millis(1500),
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance (use StrategyKind::YtDlp to shell out to yt-dlp)
    let downloader = BatchDownloader::new(config, StrategyKind::Api).await?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::BatchStarted { total, strategy } => {
                    println!("Found {} URL(s), method: {}", total, strategy);
                }
                Event::ItemStarted { index, total, url } => {
                    println!("[{}/{}] {}", index + 1, total, url);
                }
                Event::ItemSucceeded { filename, .. } => {
                    println!("  saved {}", filename);
                }
                Event::ItemFailed { reason, .. } => {
                    println!("  failed: {}", reason);
                }
                Event::BatchFinished { .. } => break,
                _ => {}
            }
        }
    });

    let result = downloader
        .run(
            "https://www.tiktok.com/@scout2015/video/6718335390845095173\n\
             not-a-url\n\
             https://www.tiktok.com/@scout2015/video/6718335390845095174",
        )
        .await?;
    printer.await?;

    println!(
        "Done! {} success, {} failed",
        result.success_count, result.fail_count
    );
    for url in result.failed_urls() {
        println!("retry later: {}", url);
    }

    Ok(())
}
