//! Command line and environment configuration.
//!
//! Every setting can be given as a flag or through its `PORTAL_*` variable;
//! the defaults are suitable for a local development run.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "portal.sqlite";
pub const DEFAULT_MEDIA_ROOT: &str = "media";
pub const DEFAULT_ALLOWED_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];
pub const DEFAULT_CONTACT_EMAIL: &str = "hello@titannexus.com";
pub const DEFAULT_FROM_EMAIL: &str = "noreply@titannexus.com";
pub const DEFAULT_SMTP_PORT: u16 = 25;
pub const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 5;

/// Titan Nexus brokerage site.
#[derive(Parser, Debug, Clone)]
#[command(name = "portal", about = "Titan Nexus industrial brokerage site", version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the web server (default).
    Serve,
    /// Load the showcase catalogue and copy into the database.
    Seed,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "PORTAL_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "PORTAL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file.
    #[arg(long, env = "PORTAL_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Directory uploaded files are written to and served from.
    #[arg(long, env = "PORTAL_MEDIA_ROOT", default_value = DEFAULT_MEDIA_ROOT)]
    pub media_root: PathBuf,

    #[arg(long, env = "PORTAL_DEBUG", default_value_t = true, action = ArgAction::Set)]
    pub debug: bool,

    /// Host names the site answers to. `*` accepts any host; a leading dot
    /// matches the domain and its subdomains.
    #[arg(
        long,
        env = "PORTAL_ALLOWED_HOSTS",
        value_delimiter = ',',
        default_value = "localhost,127.0.0.1"
    )]
    pub allowed_hosts: Vec<String>,

    /// Recipient of new request notifications. Empty disables them.
    #[arg(long, env = "PORTAL_CONTACT_EMAIL", default_value = DEFAULT_CONTACT_EMAIL)]
    pub contact_email: String,

    #[arg(long, env = "PORTAL_DEFAULT_FROM_EMAIL", default_value = DEFAULT_FROM_EMAIL)]
    pub default_from_email: String,

    /// SMTP relay. Without one, outgoing mail is written to the log.
    #[arg(long, env = "PORTAL_SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "PORTAL_SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub smtp_port: u16,

    #[arg(long, env = "PORTAL_SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    #[arg(long, env = "PORTAL_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    #[arg(long, env = "PORTAL_MAIL_TIMEOUT_SECS", default_value_t = DEFAULT_MAIL_TIMEOUT_SECS)]
    pub mail_timeout_secs: u64,

    /// Bearer token for `/api/admin`. The admin API is disabled without it.
    #[arg(long, env = "PORTAL_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: PathBuf::from(DEFAULT_DATABASE),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            debug: true,
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            default_from_email: DEFAULT_FROM_EMAIL.to_string(),
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_username: None,
            smtp_password: None,
            mail_timeout_secs: DEFAULT_MAIL_TIMEOUT_SECS,
            admin_token: None,
        }
    }
}

impl Config {
    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_timeout_secs)
    }

    /// The configured admin token, ignoring a blank value.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Whether a request addressed to `host` (port optional) may be served.
    pub fn host_allowed(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();
        let patterns: Vec<String> = self
            .allowed_hosts
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        if patterns.is_empty() {
            return self.debug && matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]");
        }

        patterns.iter().any(|pattern| match pattern.as_str() {
            "*" => true,
            p if p.starts_with('.') => host.ends_with(p) || host == p[1..],
            p => host == p,
        })
    }
}

/// `example.com:8080` -> `example.com`, `[::1]:80` -> `[::1]`.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "portal",
            "--port",
            "9000",
            "--debug",
            "false",
            "--allowed-hosts",
            "titannexus.com,.titannexus.com",
            "seed",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Command::Seed));
        assert_eq!(cli.config.port, 9000);
        assert!(!cli.config.debug);
        assert_eq!(cli.config.allowed_hosts.len(), 2);
    }

    #[test]
    fn defaults_match_development_settings() {
        let config = Config::default();
        assert!(config.debug);
        assert_eq!(config.contact_email, "hello@titannexus.com");
        assert_eq!(config.mail_timeout(), Duration::from_secs(5));
        assert_eq!(config.admin_token(), None);
    }

    #[test]
    fn host_matching() {
        let config = Config {
            allowed_hosts: vec!["titannexus.com".into(), ".nexus.io".into()],
            ..Config::default()
        };
        assert!(config.host_allowed("titannexus.com:443"));
        assert!(config.host_allowed("TitanNexus.com"));
        assert!(config.host_allowed("nexus.io"));
        assert!(config.host_allowed("eu.nexus.io"));
        assert!(!config.host_allowed("evil.com"));
        assert!(!config.host_allowed("localhost:8080"));

        let open = Config {
            allowed_hosts: vec!["*".into()],
            ..Config::default()
        };
        assert!(open.host_allowed("anything.example"));
    }

    #[test]
    fn empty_host_list_only_allows_local_in_debug() {
        let mut config = Config {
            allowed_hosts: Vec::new(),
            ..Config::default()
        };
        assert!(config.host_allowed("localhost:8080"));
        assert!(config.host_allowed("[::1]:8080"));
        config.debug = false;
        assert!(!config.host_allowed("localhost"));
    }
}
