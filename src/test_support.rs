//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

use serde_json::{Value, json};
use tokio::sync::{Mutex, MutexGuard};

use crate::client::{ClientError, ClientFuture, CommandOptions, CommandResponse, SvcClient};

/// Which half of the client seam an invocation went through.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallKind {
    /// Read-only `svc_obj_info` query.
    ObjInfo,
    /// Mutating `svc_run_command` call.
    RunCommand,
}

/// Records a single call made through [`ScriptedClient`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClientInvocation {
    /// Seam method used.
    pub kind: CallKind,
    /// Command name, for example `mkvolume`.
    pub command: String,
    /// Options passed with the command.
    pub options: CommandOptions,
    /// Target object, if any.
    pub target: Option<String>,
}

#[derive(Debug, Default)]
struct ScriptState {
    obj_info: HashMap<String, VecDeque<Result<Value, ClientError>>>,
    run_command: HashMap<String, VecDeque<Result<Option<CommandResponse>, ClientError>>>,
    invocations: Vec<ClientInvocation>,
}

/// Scripted cluster client that returns pre-seeded responses in FIFO order
/// per command name.
///
/// Queries with nothing queued answer `[]` (not found); mutations with
/// nothing queued succeed with no body. Every call is recorded.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClient {
    state: Arc<StdMutex<ScriptState>>,
}

impl ScriptedClient {
    /// Creates a client with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StdMutexGuard<'_, ScriptState> {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("scripted client lock poisoned: {err}"))
    }

    /// Queues a query response for `cmd`.
    pub fn push_obj_info(&self, cmd: &str, response: Value) {
        self.lock()
            .obj_info
            .entry(cmd.to_owned())
            .or_default()
            .push_back(Ok(response));
    }

    /// Queues a query failure for `cmd`.
    pub fn fail_obj_info(&self, cmd: &str, err: ClientError) {
        self.lock()
            .obj_info
            .entry(cmd.to_owned())
            .or_default()
            .push_back(Err(err));
    }

    /// Queues a successful mutation response for `cmd`.
    pub fn push_run_command(&self, cmd: &str, response: CommandResponse) {
        self.lock()
            .run_command
            .entry(cmd.to_owned())
            .or_default()
            .push_back(Ok(Some(response)));
    }

    /// Queues a rejection of `cmd` carrying `message` verbatim.
    pub fn reject_run_command(&self, cmd: &str, message: &str) {
        self.lock()
            .run_command
            .entry(cmd.to_owned())
            .or_default()
            .push_back(Err(ClientError::Rejected {
                command: cmd.to_owned(),
                message: message.to_owned(),
            }));
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<ClientInvocation> {
        self.lock().invocations.clone()
    }

    /// Returns only the mutating calls, in order.
    #[must_use]
    pub fn mutations(&self) -> Vec<ClientInvocation> {
        self.invocations()
            .into_iter()
            .filter(|call| call.kind == CallKind::RunCommand)
            .collect()
    }

    /// Returns the names of the mutating commands issued, in order.
    #[must_use]
    pub fn mutation_names(&self) -> Vec<String> {
        self.mutations()
            .into_iter()
            .map(|call| call.command)
            .collect()
    }

    fn record(&self, kind: CallKind, cmd: &str, options: &CommandOptions, target: Option<&str>) {
        self.lock().invocations.push(ClientInvocation {
            kind,
            command: cmd.to_owned(),
            options: options.clone(),
            target: target.map(str::to_owned),
        });
    }
}

impl SvcClient for ScriptedClient {
    fn svc_obj_info<'a>(
        &'a self,
        cmd: &'a str,
        options: &'a CommandOptions,
        target: Option<&'a str>,
    ) -> ClientFuture<'a, Value> {
        self.record(CallKind::ObjInfo, cmd, options, target);
        let next = self
            .lock()
            .obj_info
            .get_mut(cmd)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(json!([])));
        Box::pin(async move { next })
    }

    fn svc_run_command<'a>(
        &'a self,
        cmd: &'a str,
        options: &'a CommandOptions,
        target: Option<&'a str>,
    ) -> ClientFuture<'a, Option<CommandResponse>> {
        self.record(CallKind::RunCommand, cmd, options, target);
        let next = self
            .lock()
            .run_command
            .get_mut(cmd)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(None));
        Box::pin(async move { next })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets and clears environment variables while holding a global mutex.
    /// A `None` value removes the variable for the guard's lifetime.
    pub async fn set_vars(pairs: &[(&str, Option<&str>)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe {
                match value {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// Detailed `lsvdisk` payload for a fully allocated, single-copy volume.
#[must_use]
pub fn lsvdisk_detail(name: &str, capacity: u64, pool: &str) -> Value {
    json!([
        {
            "id": "24",
            "name": name,
            "capacity": capacity.to_string(),
            "mdisk_grp_name": pool,
            "type": "striped",
            "copy_count": "1",
            "se_copy_count": "0",
            "compressed_copy_count": "0",
            "deduplicated_copy_count": "0",
            "fc_map_count": "0",
            "RC_name": "",
            "volume_group_name": "",
            "cloud_backup_enabled": "no",
            "cloud_account_name": "",
            "volume_type": ""
        },
        {
            "copy_id": "0",
            "mdisk_grp_name": pool,
            "real_capacity": capacity.to_string(),
            "se_copy": "no",
            "compressed_copy": "no",
            "deduplicated_copy": "no",
            "warning": "",
            "autoexpand": ""
        }
    ])
}

/// `lsiogrp` payload with two populated groups, an empty group, and the
/// recovery group.
#[must_use]
pub fn lsiogrp_default() -> Value {
    json!([
        {"id": "0", "name": "io_grp0", "node_count": "2"},
        {"id": "1", "name": "io_grp1", "node_count": "2"},
        {"id": "2", "name": "io_grp2", "node_count": "0"},
        {"id": "4", "name": "recovery_io_grp", "node_count": "0"}
    ])
}

/// `lsvdiskaccess` payload granting `groups` access to `volume`.
#[must_use]
pub fn lsvdiskaccess(volume: &str, groups: &[&str]) -> Value {
    Value::Array(
        groups
            .iter()
            .map(|group| json!({"vdisk_name": volume, "IO_group_name": group}))
            .collect(),
    )
}
