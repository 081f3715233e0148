//! Periodic fan-out of status probes.

use crate::cache::StatusCache;
use crate::config::{PollSettings, Target, TargetAddress};
use crate::platform::PlayerSource;
use crate::probe::probe;
use dashmap::DashSet;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Drives the poll cadence and dispatches one probe per remote target.
///
/// Every cycle is fire-and-forget per target: a slow or unreachable server
/// only delays its own next observed value and never blocks its siblings or
/// the timer. Each probe writes the cache whenever it completes, in any
/// order; across cycles the last completed write wins.
pub struct Poller {
    targets: Vec<Target>,
    cache: StatusCache,
    local_players: Arc<dyn PlayerSource>,
    period: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    /// Targets whose current outage has already been logged at warn level.
    failing: Arc<DashSet<String>>,
}

impl Poller {
    pub fn new(
        targets: Vec<Target>,
        cache: StatusCache,
        local_players: Arc<dyn PlayerSource>,
        settings: &PollSettings,
    ) -> Self {
        Poller {
            targets,
            cache,
            local_players,
            period: settings.interval(),
            connect_timeout: settings.connect_timeout(),
            read_timeout: settings.read_timeout(),
            failing: Arc::new(DashSet::new()),
        }
    }

    /// Run the poll loop until the future is dropped. The first cycle fires
    /// immediately.
    pub async fn run(&self) {
        let mut timer = interval(self.period);
        info!(
            "Polling {} servers every {:?}",
            self.targets.len(),
            self.period
        );

        loop {
            timer.tick().await;
            self.poll_once();
        }
    }

    /// Dispatch one poll cycle.
    ///
    /// Local targets are answered synchronously from the host's own player
    /// registry; each remote target probes on its own task. Returns without
    /// waiting for any probe to finish.
    pub fn poll_once(&self) {
        for target in &self.targets {
            match &target.address {
                TargetAddress::Local => {
                    let count = self.local_players.player_count();
                    self.cache.set(&target.name, count);
                }
                TargetAddress::Remote { host, port } => {
                    self.dispatch_probe(&target.name, host, *port);
                }
            }
        }
    }

    fn dispatch_probe(&self, name: &str, host: &str, port: u16) {
        let name = name.to_string();
        let host = host.to_string();
        let cache = self.cache.clone();
        let failing = Arc::clone(&self.failing);
        let connect_timeout = self.connect_timeout;
        let read_timeout = self.read_timeout;

        tokio::spawn(async move {
            match probe(&host, port, connect_timeout, read_timeout).await {
                Ok(count) => {
                    debug!("{}: {} players online", name, count);
                    cache.set(&name, count);
                    if failing.remove(&name).is_some() {
                        info!("{} is reachable again", name);
                    }
                }
                Err(err) => {
                    cache.mark_failed(&name);
                    // First failure of an outage warns; repeats stay at
                    // debug until the target recovers.
                    if failing.insert(name.clone()) {
                        warn!("Failed to reach {} at {}:{}: {}", name, host, port, err);
                    } else {
                        debug!("{} still unreachable: {}", name, err);
                    }
                }
            }
        });
    }
}
