//! Transport seam for the Storage Virtualize command interface.
//!
//! Reconciliation code only ever talks to a cluster through [`SvcClient`]:
//! read-only inventory queries (`lsvdisk`, `lsiogrp`, ...) go through
//! [`SvcClient::svc_obj_info`] and mutations (`mkvolume`, `rmvolume`, ...)
//! through [`SvcClient::svc_run_command`]. [`RestClient`] is the production
//! implementation; tests script the seam instead.

mod error;
mod rest;

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::{Map, Value};

pub use error::ClientError;
pub use rest::RestClient;

/// Future returned by client operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Options passed to a cluster command, serialised as the JSON request body.
///
/// Flags (for example `-bytes`) are encoded as `true`; valued options as
/// strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandOptions(Map<String, Value>);

impl CommandOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a boolean flag.
    #[must_use]
    pub fn flag(mut self, key: &str) -> Self {
        self.0.insert(key.to_owned(), Value::Bool(true));
        self
    }

    /// Sets a valued option.
    #[must_use]
    pub fn value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_owned(), Value::String(value.into()));
        self
    }

    /// Sets a valued option when `value` is present.
    #[must_use]
    pub fn value_opt(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(inner) => self.value(key, inner),
            None => self,
        }
    }

    /// Returns the string value of `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns whether `key` is set as a flag.
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    /// Returns whether no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body returned by a successful mutating command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandResponse {
    /// Identifier of the object the command created, when reported.
    pub id: Option<String>,
    /// Human-readable confirmation, for example
    /// `Volume, id [25], successfully created`.
    pub message: Option<String>,
}

impl CommandResponse {
    /// Extracts a response from a decoded JSON body. Returns `None` when the
    /// body is not an object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            id: object.get("id").and_then(scalar_to_string),
            message: object.get("message").and_then(scalar_to_string),
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Minimal interface to a Storage Virtualize cluster.
pub trait SvcClient {
    /// Runs a read-only `ls*` query. An empty array, empty object, or null
    /// means nothing matched.
    fn svc_obj_info<'a>(
        &'a self,
        cmd: &'a str,
        options: &'a CommandOptions,
        target: Option<&'a str>,
    ) -> ClientFuture<'a, Value>;

    /// Runs a mutating command. Rejections surface as
    /// [`ClientError::Rejected`] carrying the cluster's message verbatim.
    fn svc_run_command<'a>(
        &'a self,
        cmd: &'a str,
        options: &'a CommandOptions,
        target: Option<&'a str>,
    ) -> ClientFuture<'a, Option<CommandResponse>>;
}
