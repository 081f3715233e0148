use clap::Parser;
use log::info;
use poller::cache::StatusCache;
use poller::config::Config;
use poller::placeholder::PlaceholderEngine;
use poller::platform::NoLocalPlayers;
use poller::poll::Poller;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::interval;

/// Main-method of the application.
/// Parses command-line arguments, loads the configuration, then runs the
/// poll loop until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Path to the configuration file (created with defaults if absent)
        #[clap(short, long, default_value = "config.toml")]
        config: PathBuf,
        /// Template rendered through the placeholder engine and logged once
        /// per poll interval, e.g. "lobby: %online_lobby%"
        #[clap(short, long)]
        status_line: Option<String>,
    }

    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    let config = Config::load_or_create(&args.config)?;
    let targets = config.targets();
    info!("Loaded configuration with {} servers", targets.len());

    let cache = StatusCache::new();
    let engine = PlaceholderEngine::new(cache.clone());
    let poller = Poller::new(targets, cache, Arc::new(NoLocalPlayers), &config.poll);

    // Optionally report a rendered status line alongside the poll loop.
    let reporter = args.status_line.map(|template| {
        let engine = engine.clone();
        let period = config.poll.interval();
        tokio::spawn(async move {
            let mut timer = interval(period);
            loop {
                timer.tick().await;
                info!("{}", engine.substitute(&template));
            }
        })
    });

    // Handle shutdown gracefully
    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    if let Some(handle) = reporter {
        handle.abort();
    }

    Ok(())
}
