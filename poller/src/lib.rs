//! # Status Poller Library
//!
//! This library keeps live online-player counts for a configured set of
//! game servers and substitutes them into arbitrary text through the
//! `%online_<server>%` placeholder syntax.
//!
//! ## How it works
//!
//! A periodic scheduler fires every poll interval and dispatches one
//! short-lived status probe per configured remote server. Each probe runs
//! the minimal handshake + status exchange (see the `protocol` crate),
//! extracts the online count from the status JSON and writes it into a
//! shared cache as it completes. Targets configured with the reserved
//! address `current`/`this` skip the network entirely and read the host
//! process's own player count.
//!
//! Failures are per-target and never fatal: an unreachable server keeps its
//! last known good count (0 if it never answered) and is retried on the
//! next cycle. Readers see whatever the most recently completed probe
//! wrote — the data is a point-in-time approximation by nature.
//!
//! ## Module Organization
//!
//! - [`config`] — the TOML `[servers]` table plus poll tuning
//! - [`probe`] — one handshake + status exchange with bounded timeouts
//! - [`poll`] — the interval-driven fan-out writing into the cache
//! - [`cache`] — the shared last-value store, safe for concurrent readers
//! - [`placeholder`] — `%online_<server>%` substitution over text
//! - [`platform`] — the seam towards the embedding host's player registry
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use poller::cache::StatusCache;
//! use poller::config::Config;
//! use poller::placeholder::PlaceholderEngine;
//! use poller::platform::NoLocalPlayers;
//! use poller::poll::Poller;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_create(Path::new("config.toml"))?;
//!
//!     let cache = StatusCache::new();
//!     let engine = PlaceholderEngine::new(cache.clone());
//!     let poller = Poller::new(
//!         config.targets(),
//!         cache,
//!         Arc::new(NoLocalPlayers),
//!         &config.poll,
//!     );
//!
//!     tokio::spawn(async move { poller.run().await });
//!
//!     // Render text from anywhere, any time; reads never block.
//!     println!("{}", engine.substitute("lobby: %online_lobby%"));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod placeholder;
pub mod platform;
pub mod poll;
pub mod probe;
