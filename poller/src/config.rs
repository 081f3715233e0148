//! Configuration loading: which servers to poll and how often.
//!
//! The file is TOML with a `[servers]` table mapping a placeholder name to
//! an address string, plus an optional `[poll]` section for tuning the
//! cadence and timeouts. The reserved address values `current` and `this`
//! (case-insensitive) read the local player count instead of probing the
//! network.

use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Port assumed for targets configured without one.
pub const DEFAULT_PORT: u16 = 25565;

const DEFAULT_CONFIG: &str = "\
# headcount configuration
# Add the servers whose player counts you want to track.
# Format: placeholder_name = \"host:port\" (port defaults to 25565)
# Use \"current\" or \"this\" to read the local player count instead of
# probing the network.

[servers]
lobby = \"127.0.0.1:25565\"

# [poll]
# interval_secs = 5
# connect_timeout_ms = 3000
# read_timeout_ms = 3000
";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to create default config at {path}: {source}")]
    Create {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Placeholder name -> address string, verbatim from the file.
    #[serde(default)]
    pub servers: HashMap<String, String>,
    #[serde(default)]
    pub poll: PollSettings,
}

/// Cadence and timeout tuning, all optional in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            connect_timeout_ms: 3000,
            read_timeout_ms: 3000,
        }
    }
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Where a target's count comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddress {
    /// The host process itself; answered synchronously, no network exchange.
    Local,
    /// A remote server reached over TCP.
    Remote { host: String, port: u16 },
}

/// One configured server. Immutable after load; there is no hot-reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub address: TargetAddress,
}

impl Config {
    /// Read and parse the configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Like [`Config::load`], but writes a commented default file first if
    /// none exists yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let create = |source| ConfigError::Create {
                path: path.display().to_string(),
                source,
            };
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(create)?;
                }
            }
            fs::write(path, DEFAULT_CONFIG).map_err(create)?;
        }
        Self::load(path)
    }

    /// Resolve the `[servers]` table into probe targets, sorted by name.
    ///
    /// Entries with a malformed address are logged at warn level and
    /// skipped; their names keep reading as count 0. Never fatal.
    pub fn targets(&self) -> Vec<Target> {
        let mut targets: Vec<Target> = Vec::with_capacity(self.servers.len());
        for (name, raw) in &self.servers {
            match parse_address(raw) {
                Ok(address) => targets.push(Target {
                    name: name.clone(),
                    address,
                }),
                Err(reason) => warn!("Ignoring server '{}': {}", name, reason),
            }
        }
        targets.sort_by(|a, b| a.name.cmp(&b.name));
        targets
    }
}

fn parse_address(raw: &str) -> Result<TargetAddress, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("current") || raw.eq_ignore_ascii_case("this") {
        return Ok(TargetAddress::Local);
    }

    let (host, port) = match raw.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| format!("invalid port '{}'", port))?;
            (host, port)
        }
        None => (raw, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(format!("empty host in '{}'", raw));
    }

    Ok(TargetAddress::Remote {
        host: host.to_string(),
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn full_file_parses() {
        let config = parse(
            r#"
            [servers]
            lobby = "play.example.net:25565"
            hub = "current"

            [poll]
            interval_secs = 10
            connect_timeout_ms = 1500
            read_timeout_ms = 2500
            "#,
        );

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.poll.interval(), Duration::from_secs(10));
        assert_eq!(config.poll.connect_timeout(), Duration::from_millis(1500));
        assert_eq!(config.poll.read_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn missing_poll_section_uses_defaults() {
        let config = parse(
            r#"
            [servers]
            lobby = "play.example.net"
            "#,
        );

        assert_eq!(config.poll.interval(), Duration::from_secs(5));
        assert_eq!(config.poll.connect_timeout(), Duration::from_millis(3000));
        assert_eq!(config.poll.read_timeout(), Duration::from_millis(3000));
    }

    #[test]
    fn empty_file_is_valid() {
        let config = parse("");
        assert!(config.servers.is_empty());
        assert!(config.targets().is_empty());
    }

    #[test]
    fn reserved_address_is_case_insensitive() {
        for raw in ["current", "CURRENT", "Current", "this", "THIS"] {
            assert_eq!(parse_address(raw).unwrap(), TargetAddress::Local);
        }
    }

    #[test]
    fn remote_address_with_port() {
        assert_eq!(
            parse_address("play.example.net:25570").unwrap(),
            TargetAddress::Remote {
                host: "play.example.net".to_string(),
                port: 25570,
            }
        );
    }

    #[test]
    fn remote_address_defaults_port() {
        assert_eq!(
            parse_address("play.example.net").unwrap(),
            TargetAddress::Remote {
                host: "play.example.net".to_string(),
                port: DEFAULT_PORT,
            }
        );
    }

    #[test]
    fn malformed_port_is_rejected() {
        assert!(parse_address("play.example.net:notaport").is_err());
        assert!(parse_address("play.example.net:99999").is_err());
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(parse_address(":25565").is_err());
    }

    #[test]
    fn bad_entries_are_skipped_not_fatal() {
        let config = parse(
            r#"
            [servers]
            good = "play.example.net:25565"
            bad = "play.example.net:notaport"
            "#,
        );

        let targets = config.targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "good");
    }

    #[test]
    fn targets_are_sorted_by_name() {
        let config = parse(
            r#"
            [servers]
            zeta = "z.example.net"
            alpha = "a.example.net"
            "#,
        );

        let names: Vec<_> = config.targets().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.servers.len(), 1);
        assert!(config.servers.contains_key("lobby"));

        // Second load reads the file that was just created.
        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.servers, config.servers);
    }
}
