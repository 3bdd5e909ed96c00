//! Worker process spawning: this same binary, re-invoked with a hidden environment-encoded
//! flag carrying its partition, endpoint, and inspector kind.
//!
//! Rust has no safe equivalent of `fork()` once an async runtime is already running, so each
//! worker is a freshly exec'd child process of the controller's own binary rather than a forked
//! copy of it. The child detects worker mode from `TLSC_WORKER=1` and never parses it as a
//! user-facing CLI flag.

use std::{path::PathBuf, process::Stdio};

use inspect::{InspectorKind, TaskSpec};
use tokio::process::{Child, Command};

use crate::error::ControllerError;

const ENV_WORKER: &str = "TLSC_WORKER";
const ENV_INDEX: &str = "TLSC_WORKER_INDEX";
const ENV_ENDPOINT: &str = "TLSC_WORKER_ENDPOINT";
const ENV_KIND: &str = "TLSC_WORKER_KIND";
const ENV_RANGE: &str = "TLSC_WORKER_RANGE";
const ENV_CONTRACTS: &str = "TLSC_WORKER_CONTRACTS";
const ENV_DATABASE_URL: &str = "TLSC_WORKER_DATABASE_URL";
const ENV_CONFIG_PATH: &str = "TLSC_WORKER_CONFIG_PATH";

/// Everything a worker process needs, decoded from its environment at startup.
#[derive(Debug, Clone)]
pub struct WorkerArgs {
    /// This worker's index among its siblings, used for log file naming.
    pub index: usize,
    /// The RPC endpoint URL this worker exclusively uses.
    pub endpoint: String,
    /// Which batch fetcher this worker drives.
    pub kind: InspectorKind,
    /// The sub-partition of the global task this worker is responsible for.
    pub task: TaskSpec,
    /// The database connection string this worker opens its own session against.
    pub database_url: String,
    /// Path to the configuration file, reloaded by the worker for its own logging setup.
    pub config_path: PathBuf,
}

/// Reads `TLSC_WORKER` and, if set, decodes the rest of the worker environment.
///
/// Returns `None` when the process was invoked as the controller (the common case); `Some`
/// identifies this process as a re-exec'd worker.
///
/// # Panics
/// Panics if `TLSC_WORKER=1` is set but any companion variable is missing or malformed — this
/// indicates the controller's own spawn logic is broken, not a user error, so it is not worth
/// modeling as a recoverable [`ControllerError`].
#[must_use]
pub fn worker_args_from_env() -> Option<WorkerArgs> {
    decode_worker_env(|key| std::env::var(key).ok())
}

/// The pure decoding half of [`worker_args_from_env`], parameterized over a variable lookup so
/// it can be exercised against a fake environment in tests.
///
/// # Panics
/// Panics if `TLSC_WORKER=1` is set but any companion variable is missing or malformed — this
/// indicates the controller's own spawn logic is broken, not a user error, so it is not worth
/// modeling as a recoverable [`ControllerError`].
fn decode_worker_env(lookup: impl Fn(&str) -> Option<String>) -> Option<WorkerArgs> {
    if lookup(ENV_WORKER).as_deref() != Some("1") {
        return None;
    }

    let index: usize =
        lookup(ENV_INDEX).expect("worker env missing index").parse().expect("worker index not a number");
    let endpoint = lookup(ENV_ENDPOINT).expect("worker env missing endpoint");
    let kind = match lookup(ENV_KIND).expect("worker env missing kind").as_str() {
        "tlsc" => InspectorKind::Tlsc,
        "block" => InspectorKind::Block,
        "contract" => InspectorKind::Contract,
        other => panic!("unknown worker kind {other:?}"),
    };
    let database_url = lookup(ENV_DATABASE_URL).expect("worker env missing database url");
    let config_path = PathBuf::from(lookup(ENV_CONFIG_PATH).expect("worker env missing config path"));

    let task = if let Some(range) = lookup(ENV_RANGE) {
        let (a, b) = range.split_once(',').expect("worker range malformed");
        TaskSpec::BlockRange {
            a: a.parse().expect("worker range start not a number"),
            b: b.parse().expect("worker range end not a number"),
        }
    } else {
        let contracts = lookup(ENV_CONTRACTS).expect("worker env missing contracts");
        TaskSpec::ContractList(contracts.split(',').map(str::to_owned).filter(|s| !s.is_empty()).collect())
    };

    Some(WorkerArgs { index, endpoint, kind, task, database_url, config_path })
}

/// Spawns one worker process: this same binary, re-exec'd with the environment encoding its
/// assignment.
///
/// # Errors
/// Returns [`ControllerError::Spawn`] if the child process cannot be started.
pub fn spawn_worker(exe: &std::path::Path, args: &WorkerArgs) -> Result<Child, ControllerError> {
    let mut command = Command::new(exe);
    command
        .env(ENV_WORKER, "1")
        .env(ENV_INDEX, args.index.to_string())
        .env(ENV_ENDPOINT, &args.endpoint)
        .env(ENV_DATABASE_URL, &args.database_url)
        .env(ENV_CONFIG_PATH, &args.config_path)
        .stdin(Stdio::null());

    match args.kind {
        InspectorKind::Tlsc => {
            command.env(ENV_KIND, "tlsc");
        }
        InspectorKind::Block => {
            command.env(ENV_KIND, "block");
        }
        InspectorKind::Contract => {
            command.env(ENV_KIND, "contract");
        }
    }

    match &args.task {
        TaskSpec::BlockRange { a, b } => {
            command.env(ENV_RANGE, format!("{a},{b}"));
        }
        TaskSpec::ContractList(addresses) => {
            command.env(ENV_CONTRACTS, addresses.join(","));
        }
    }

    command.spawn().map_err(|source| ControllerError::Spawn { index: args.index, source })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn fake_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn absent_marker_decodes_to_none() {
        let env = fake_env(&[]);
        assert!(decode_worker_env(|k| env.get(k).cloned()).is_none());
    }

    #[test]
    fn decodes_a_block_range_worker() {
        let env = fake_env(&[
            (ENV_WORKER, "1"),
            (ENV_INDEX, "2"),
            (ENV_ENDPOINT, "http://10.0.0.5:8545/"),
            (ENV_KIND, "block"),
            (ENV_RANGE, "100,200"),
            (ENV_DATABASE_URL, "sqlite:///tmp/tlsc.db"),
            (ENV_CONFIG_PATH, "/etc/tlsc.ini"),
        ]);

        let args = decode_worker_env(|k| env.get(k).cloned()).expect("worker marker set");
        assert_eq!(args.index, 2);
        assert_eq!(args.endpoint, "http://10.0.0.5:8545/");
        assert_eq!(args.kind, InspectorKind::Block);
        assert!(matches!(args.task, TaskSpec::BlockRange { a: 100, b: 200 }));
        assert_eq!(args.config_path, PathBuf::from("/etc/tlsc.ini"));
    }

    #[test]
    fn decodes_a_contract_list_worker() {
        let env = fake_env(&[
            (ENV_WORKER, "1"),
            (ENV_INDEX, "0"),
            (ENV_ENDPOINT, "http://10.0.0.1:8545/"),
            (ENV_KIND, "contract"),
            (ENV_CONTRACTS, "0xabc,0xdef"),
            (ENV_DATABASE_URL, "sqlite:///tmp/tlsc.db"),
            (ENV_CONFIG_PATH, "/etc/tlsc.ini"),
        ]);

        let args = decode_worker_env(|k| env.get(k).cloned()).expect("worker marker set");
        assert_eq!(args.kind, InspectorKind::Contract);
        match args.task {
            TaskSpec::ContractList(addresses) => {
                assert_eq!(addresses, vec!["0xabc".to_owned(), "0xdef".to_owned()]);
            }
            TaskSpec::BlockRange { .. } => panic!("expected a contract list task"),
        }
    }

    #[tokio::test]
    async fn spawn_worker_launches_a_child_carrying_the_worker_marker() {
        let args = WorkerArgs {
            index: 3,
            endpoint: "http://10.0.0.9:8545/".to_owned(),
            kind: InspectorKind::Tlsc,
            task: TaskSpec::BlockRange { a: 10, b: 20 },
            database_url: "sqlite:///tmp/tlsc.db".to_owned(),
            config_path: PathBuf::from("/etc/tlsc.ini"),
        };

        // `/bin/true` ignores its environment and exits 0; this only exercises that `spawn_worker`
        // builds a runnable `Command` and that the child can be awaited to completion, not the
        // exact variables it set (the encode/decode roundtrip is covered by `decode_worker_env`).
        let exe = PathBuf::from("/bin/true");
        let mut child = spawn_worker(&exe, &args).expect("/bin/true should be spawnable");
        let status = child.wait().await.expect("child process should be awaitable");
        assert!(status.success());
    }
}
