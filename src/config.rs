//! Cluster connection configuration loaded via `ortho-config`.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_REST_PORT: u16 = 7443;

/// Connection settings for a Storage Virtualize cluster, merged from
/// defaults, configuration files, environment variables, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SVC",
    discovery(
        app_name = "vdiskctl",
        env_var = "VDISKCTL_CONFIG_PATH",
        config_file_name = "vdiskctl.toml",
        dotfile_name = ".vdiskctl.toml",
        project_file_name = "vdiskctl.toml"
    )
)]
pub struct ClusterConfig {
    /// Hostname or IP address of the cluster management interface.
    #[ortho_config(default = String::new())]
    pub clustername: String,
    /// Optional DNS domain appended to `clustername`.
    pub domain: Option<String>,
    /// REST API user. Required unless `token` is provided.
    pub username: Option<String>,
    /// REST API password. Required unless `token` is provided.
    pub password: Option<String>,
    /// Pre-issued authentication token; skips the `/auth` exchange.
    pub token: Option<String>,
    /// HTTPS port of the REST endpoint.
    #[ortho_config(default = 7443)]
    pub port: u16,
    /// Whether to verify the cluster's TLS certificate.
    #[ortho_config(default = true)]
    pub validate_certs: bool,
    /// Optional file that receives log output instead of stderr.
    pub log_path: Option<String>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to vdiskctl.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const CLUSTERNAME: FieldMetadata =
    FieldMetadata::new("cluster name", "SVC_CLUSTERNAME", "clustername");
const USERNAME: FieldMetadata = FieldMetadata::new("REST API user", "SVC_USERNAME", "username");
const PASSWORD: FieldMetadata =
    FieldMetadata::new("REST API password", "SVC_PASSWORD", "password");

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|inner| inner.trim().is_empty())
}

impl ClusterConfig {
    /// Creates a configuration for `clustername` with default port and
    /// certificate validation, and no credentials.
    #[must_use]
    pub fn new(clustername: impl Into<String>) -> Self {
        Self {
            clustername: clustername.into(),
            domain: None,
            username: None,
            password: None,
            token: None,
            port: DEFAULT_REST_PORT,
            validate_certs: true,
            log_path: None,
        }
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("vdiskctl")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the host part of the REST endpoint.
    #[must_use]
    pub fn host(&self) -> String {
        let cluster = self.clustername.trim();
        match self.domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => format!("{cluster}.{domain}"),
            _ => cluster.to_owned(),
        }
    }

    /// Returns the base URL of the REST command interface.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("https://{}:{}/rest/v1", self.host(), self.port)
    }

    /// Performs semantic validation. Either a token or both username and
    /// password must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the environment variable
    /// and TOML key of the first missing value, or
    /// [`ConfigError::InvalidPort`] when the port is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clustername.trim().is_empty() {
            return Err(CLUSTERNAME.missing());
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !is_blank(self.token.as_deref()) {
            return Ok(());
        }
        if is_blank(self.username.as_deref()) {
            return Err(USERNAME.missing());
        }
        if is_blank(self.password.as_deref()) {
            return Err(PASSWORD.missing());
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Raised when the REST port is zero.
    #[error("port must be greater than zero")]
    InvalidPort,
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
