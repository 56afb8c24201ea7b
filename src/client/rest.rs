//! REST implementation of [`SvcClient`].

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ClientError, ClientFuture, CommandOptions, CommandResponse, SvcClient};
use crate::config::ClusterConfig;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
}

/// Client for the `/rest/v1` command interface of a cluster.
///
/// The authentication token is requested lazily on the first command and
/// reused for the lifetime of the client.
#[derive(Debug)]
pub struct RestClient {
    http: reqwest::Client,
    host: String,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    token: Mutex<Option<String>>,
}

impl RestClient {
    /// Constructs a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the configuration fails
    /// validation and [`ClientError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn new(config: &ClusterConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(!config.validate_certs)
            .build()
            .map_err(|err| ClientError::Transport {
                message: err.to_string(),
            })?;
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        Ok(Self {
            http,
            host: config.host(),
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            token: Mutex::new(token),
        })
    }

    /// Returns the base URL commands are posted to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn command_url(&self, cmd: &str, target: Option<&str>) -> String {
        match target {
            Some(object) => format!("{}/{cmd}/{object}", self.base_url),
            None => format!("{}/{cmd}", self.base_url),
        }
    }

    async fn token(&self) -> Result<String, ClientError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.authenticate().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn authenticate(&self) -> Result<String, ClientError> {
        let auth_error = |message: String| ClientError::Auth {
            host: self.host.clone(),
            message,
        };
        debug!(host = %self.host, "requesting REST token");
        let response = self
            .http
            .post(format!("{}/auth", self.base_url))
            .header("X-Auth-Username", self.username.as_deref().unwrap_or_default())
            .header("X-Auth-Password", self.password.as_deref().unwrap_or_default())
            .send()
            .await
            .map_err(|err| auth_error(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| auth_error(err.to_string()))?;
        if !status.is_success() {
            return Err(auth_error(String::from_utf8_lossy(&body).trim().to_owned()));
        }
        let parsed: AuthResponse =
            serde_json::from_slice(&body).map_err(|err| auth_error(err.to_string()))?;
        Ok(parsed.token)
    }

    async fn post(
        &self,
        cmd: &str,
        options: &CommandOptions,
        target: Option<&str>,
    ) -> Result<Value, ClientError> {
        let token = self.token().await?;
        let url = self.command_url(cmd, target);
        debug!(command = cmd, target = ?target, "posting command");
        let response = self
            .http
            .post(&url)
            .header("X-Auth-Token", token)
            .json(options)
            .send()
            .await
            .map_err(|err| ClientError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::Transport {
                message: err.to_string(),
            })?;

        if !status.is_success() {
            return Err(rejection(cmd, status, &body));
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|err| ClientError::Decode {
            command: cmd.to_owned(),
            message: err.to_string(),
        })
    }
}

fn rejection(cmd: &str, status: StatusCode, body: &[u8]) -> ClientError {
    let text = String::from_utf8_lossy(body).trim().to_owned();
    let message = if text.is_empty() {
        format!("{cmd} failed with HTTP status {status}")
    } else {
        text
    };
    ClientError::Rejected {
        command: cmd.to_owned(),
        message,
    }
}

impl SvcClient for RestClient {
    fn svc_obj_info<'a>(
        &'a self,
        cmd: &'a str,
        options: &'a CommandOptions,
        target: Option<&'a str>,
    ) -> ClientFuture<'a, Value> {
        Box::pin(async move { self.post(cmd, options, target).await })
    }

    fn svc_run_command<'a>(
        &'a self,
        cmd: &'a str,
        options: &'a CommandOptions,
        target: Option<&'a str>,
    ) -> ClientFuture<'a, Option<CommandResponse>> {
        Box::pin(async move {
            let body = self.post(cmd, options, target).await?;
            Ok(CommandResponse::from_value(&body))
        })
    }
}
