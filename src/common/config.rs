use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Remediation target
    pub const TARGET_COMMANDS_PER_PATH: u32 = 1;
    pub const ROUND_ROBIN_PLUGIN: &'static str = "VMW_PSP_RR";

    // Network Configuration
    pub const DEFAULT_PORT: u16 = 443;
    pub const PROBE_TIMEOUT_SECS: u64 = 5;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;
    pub const SESSION_HEADER: &'static str = "vmware-api-session-id";

    // Environment
    pub const PASSWORD_ENV: &'static str = "RR_IOPS_PASSWORD";
    pub const DEFAULT_LOG_FILTER: &'static str = "rr_iops=info";

    // Reports
    pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
}

/// Address of the management server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parse `vc01.example.com`, `vc01:8443` or `https://vc01` style input.
    /// `default_port` applies when the input carries no explicit port.
    pub fn parse(input: &str, default_port: u16) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::Config("server address is empty".to_string()));
        }

        let has_scheme = trimmed.contains("://");
        let with_scheme = if has_scheme {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| Error::Config(format!("invalid server address '{trimmed}': {e}")))?;

        let scheme = url.scheme().to_string();
        if scheme != "https" && scheme != "http" {
            return Err(Error::Config(format!(
                "unsupported scheme '{scheme}' in server address '{trimmed}'"
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Config(format!("server address '{trimmed}' has no host")))?
            .to_string();

        // Url::port() is None when the port equals the scheme default.
        let port = match url.port() {
            Some(port) => port,
            None if has_scheme && default_port == AppConfig::DEFAULT_PORT => {
                url.port_or_known_default().unwrap_or(default_port)
            }
            None => default_port,
        };

        Ok(Self { scheme, host, port })
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Username and password for the management server.
///
/// The password never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything a remediation run needs, resolved before the run starts.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub endpoint: Endpoint,
    pub cluster_name: String,
    pub credentials: Credentials,
    pub output_dir: PathBuf,
    pub target_commands_per_path: u32,
    pub dry_run: bool,
    pub accept_invalid_certs: bool,
    pub probe_timeout: Duration,
}

impl WorkflowConfig {
    pub fn new(endpoint: Endpoint, cluster_name: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            endpoint,
            cluster_name: cluster_name.into(),
            credentials,
            output_dir: PathBuf::from("."),
            target_commands_per_path: AppConfig::TARGET_COMMANDS_PER_PATH,
            dry_run: false,
            accept_invalid_certs: false,
            probe_timeout: Duration::from_secs(AppConfig::PROBE_TIMEOUT_SECS),
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Reject configurations that cannot start a run.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(Error::Config("cluster name is empty".to_string()));
        }
        if self.credentials.username.trim().is_empty() {
            return Err(Error::Config("username is empty".to_string()));
        }
        if self.probe_timeout.is_zero() {
            return Err(Error::Config("probe timeout must be positive".to_string()));
        }
        Ok(())
    }
}
