//! Process configuration.
//!
//! Every value comes from the environment (`PORT`, `HOST`, `APP_ENV`, ...);
//! the matching command-line flags override it. [`Args`] is what clap
//! parses, [`ServerConfig`] is the validated result the server runs with.

use std::{fmt, path::PathBuf, time::Duration};

use clap::Parser;

use crate::ServerError;

/// Host key location used when `HOST_KEY_PATH` is not set.
pub const DEFAULT_HOST_KEY_PATH: &str = ".ssh/id_ed25519";

/// Idle connection timeout used when `IDLE_TIMEOUT_SECS` is not set.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// SSH portfolio server
#[derive(Parser, Debug, Clone)]
#[command(name = "folio-server")]
#[command(about = "Serve an interactive portfolio over SSH")]
#[command(version)]
pub struct Args {
    /// TCP port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<String>,

    /// Address or hostname to listen on
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Deployment environment; `local` prints the command to connect
    #[arg(long, env = "APP_ENV")]
    pub app_env: Option<String>,

    /// Path to the SSH host key, generated if missing
    #[arg(long, env = "HOST_KEY_PATH", default_value = DEFAULT_HOST_KEY_PATH)]
    pub host_key_path: PathBuf,

    /// Seconds of inactivity before a connection is closed
    #[arg(long, env = "IDLE_TIMEOUT_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Deployment environment tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppEnv {
    /// Exactly `local`: a developer machine.
    Local,
    /// Any other non-empty tag.
    Named(String),
    /// Not set.
    #[default]
    Unset,
}

impl AppEnv {
    /// Interpret a raw `APP_ENV` value. Only the exact string `local` is local.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("local") => Self::Local,
            Some(tag) if !tag.is_empty() => Self::Named(tag.to_string()),
            _ => Self::Unset,
        }
    }

    /// Whether the server runs on a developer machine.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Named(tag) => f.write_str(tag),
            Self::Unset => f.write_str("unset"),
        }
    }
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen host, as given.
    pub host: String,
    /// Listen port. `0` asks the OS for a free port.
    pub port: u16,
    /// Deployment environment.
    pub app_env: AppEnv,
    /// SSH host key file.
    pub host_key_path: PathBuf,
    /// Connections without traffic for this long are closed.
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// Validate parsed arguments.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] if the port or host is missing or empty, or
    /// the port is not a number in `0..=65535`.
    pub fn from_args(args: &Args) -> Result<Self, ServerError> {
        let port = required("PORT", args.port.as_deref())?;
        let port = port
            .parse::<u16>()
            .map_err(|_| ServerError::Config(format!("PORT must be a port number, got {port:?}")))?;
        let host = required("HOST", args.host.as_deref())?;

        Ok(Self {
            host: host.to_string(),
            port,
            app_env: AppEnv::parse(args.app_env.as_deref()),
            host_key_path: args.host_key_path.clone(),
            idle_timeout: Duration::from_secs(args.idle_timeout_secs),
        })
    }

    /// Address to bind: `host:port`, with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        join_host_port(&self.host, self.port)
    }

    /// Command a developer can paste to connect, when running locally.
    pub fn connect_hint(&self) -> Option<String> {
        self.app_env
            .is_local()
            .then(|| format!("To SSH into the server, run `ssh -p {} {}`", self.port, self.host))
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ServerError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ServerError::Config(format!("{name} is not set"))),
    }
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(port: Option<&str>, host: Option<&str>) -> Args {
        Args {
            port: port.map(str::to_string),
            host: host.map(str::to_string),
            app_env: None,
            host_key_path: PathBuf::from(DEFAULT_HOST_KEY_PATH),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn valid_args() {
        let config = ServerConfig::from_args(&args(Some("23234"), Some("0.0.0.0"))).unwrap();
        assert_eq!(config.address(), "0.0.0.0:23234");
        assert_eq!(config.idle_timeout, Duration::from_secs(600));
        assert_eq!(config.app_env, AppEnv::Unset);
    }

    #[test]
    fn missing_or_empty_values_are_config_errors() {
        for (port, host) in [(None, Some("localhost")), (Some("22"), None), (Some(""), Some("h"))] {
            let err = ServerConfig::from_args(&args(port, host)).unwrap_err();
            assert!(matches!(err, ServerError::Config(_)), "{err}");
        }
    }

    #[test]
    fn bad_port_is_config_error() {
        for port in ["ssh", "70000", "-1"] {
            let err = ServerConfig::from_args(&args(Some(port), Some("localhost"))).unwrap_err();
            assert!(matches!(err, ServerError::Config(_)), "{port}: {err}");
        }
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        assert_eq!(join_host_port("::1", 22), "[::1]:22");
        assert_eq!(join_host_port("[::1]", 22), "[::1]:22");
        assert_eq!(join_host_port("localhost", 22), "localhost:22");
    }

    #[test]
    fn only_exact_local_is_local() {
        assert!(AppEnv::parse(Some("local")).is_local());
        assert!(!AppEnv::parse(Some("Local")).is_local());
        assert!(!AppEnv::parse(Some("production")).is_local());
        assert_eq!(AppEnv::parse(Some("")), AppEnv::Unset);
    }

    #[test]
    fn connect_hint_only_when_local() {
        let mut config = ServerConfig::from_args(&args(Some("23234"), Some("localhost"))).unwrap();
        assert_eq!(config.connect_hint(), None);

        config.app_env = AppEnv::Local;
        assert_eq!(
            config.connect_hint().as_deref(),
            Some("To SSH into the server, run `ssh -p 23234 localhost`")
        );
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "folio-server",
            "--port",
            "2222",
            "--host",
            "127.0.0.1",
            "--app-env",
            "local",
            "--idle-timeout-secs",
            "5",
        ])
        .unwrap();
        let config = ServerConfig::from_args(&args).unwrap();

        assert_eq!(config.port, 2222);
        assert!(config.app_env.is_local());
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
    }
}
