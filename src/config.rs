//! Server configuration, read once at startup.
//!
//! Every value can come from a command-line flag or its environment variable.
//! The resulting [`ServerConfig`] is handed to the router; handlers never read
//! the environment themselves.

use crate::fetch::DEFAULT_UPSTREAM;
use crate::{Error, Result};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// RFox Calendar - recolored contribution calendars over HTTP
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 10000)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Comma-separated CORS origins; unset or `*` allows any origin
    #[arg(long, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    /// Comma-separated trusted hosts (`*.example.com` wildcards allowed);
    /// unset or `*` allows any host
    #[arg(long, env = "ALLOWED_HOSTS")]
    pub allowed_hosts: Option<String>,

    /// Base URL of the upstream site
    #[arg(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM)]
    pub upstream_url: String,

    /// Number of runtime worker threads
    #[arg(short, long, env = "WEB_CONCURRENCY", default_value_t = 4)]
    pub workers: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// An allowlist parsed from a comma-separated setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    Any,
    Only(Vec<String>),
}

impl AllowList {
    /// Parse a comma-separated list. Unset, blank, or containing `*` means any.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return AllowList::Any;
        };
        let entries: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if entries.is_empty() || entries.iter().any(|e| e == "*") {
            AllowList::Any
        } else {
            AllowList::Only(entries)
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, AllowList::Any)
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub allowed_origins: AllowList,
    pub allowed_hosts: AllowList,
    pub upstream_url: String,
    pub workers: usize,
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 10000),
            allowed_origins: AllowList::Any,
            allowed_hosts: AllowList::Any,
            upstream_url: DEFAULT_UPSTREAM.to_string(),
            workers: 4,
            verbose: false,
        }
    }
}

impl ServerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.workers == 0 {
            return Err(Error::ConfigError("workers must be at least 1".into()));
        }
        Ok(Self {
            addr: SocketAddr::new(cli.host, cli.port),
            allowed_origins: AllowList::parse(cli.allowed_origins.as_deref()),
            allowed_hosts: AllowList::parse(cli.allowed_hosts.as_deref()),
            upstream_url: cli.upstream_url,
            workers: cli.workers,
            verbose: cli.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_star_allows_everything() {
        assert_eq!(AllowList::parse(None), AllowList::Any);
        assert_eq!(AllowList::parse(Some("")), AllowList::Any);
        assert_eq!(AllowList::parse(Some("a.com,*")), AllowList::Any);
    }

    #[test]
    fn comma_list_is_trimmed() {
        assert_eq!(
            AllowList::parse(Some("https://a.com, https://b.com ,")),
            AllowList::Only(vec!["https://a.com".into(), "https://b.com".into()])
        );
    }

    #[test]
    fn flags_build_server_config() {
        let cli = Cli::try_parse_from([
            "rfcalendar",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--allowed-hosts",
            "example.com,*.example.org",
            "--upstream-url",
            "http://localhost:9000",
            "--workers",
            "2",
        ])
        .unwrap();
        let config = ServerConfig::from_cli(cli).unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(
            config.allowed_hosts,
            AllowList::Only(vec!["example.com".into(), "*.example.org".into()])
        );
        assert_eq!(config.upstream_url, "http://localhost:9000");
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let cli = Cli::try_parse_from(["rfcalendar", "--workers", "0"]).unwrap();
        assert!(matches!(ServerConfig::from_cli(cli), Err(Error::ConfigError(_))));
    }

    #[test]
    fn defaults_match_service_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 10000);
        assert!(config.allowed_origins.is_any());
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM);
    }
}
