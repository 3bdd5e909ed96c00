//! The controller loop (§4.7): partition the global task, assign endpoints, spawn workers,
//! await them without killing siblings on failure.

use std::path::Path;

use inspect::InspectorKind;
use storage::Gateway;
use tracing::{error, info, warn};

use crate::{
    endpoints::assign_endpoint,
    error::ControllerError,
    partition::{partition_block_range, partition_contracts},
    worker::{spawn_worker, WorkerArgs},
};

/// The global unit of work a controller distributes across `N` workers.
#[derive(Debug, Clone)]
pub enum GlobalTask {
    /// A block range `[a, b)`.
    BlockRange {
        /// Inclusive lower bound.
        a: i64,
        /// Exclusive upper bound.
        b: i64,
    },
    /// An explicit list of contract addresses.
    Contracts(Vec<String>),
}

/// Runs the controller: ensures the schema exists, partitions `task` into `worker_count`
/// pieces, assigns each an endpoint round-robin, spawns a worker process per piece, and awaits
/// every one of them.
///
/// Returns `Ok(())` only if every worker exited successfully; a single worker's failure does
/// not stop its siblings (partial progress is valuable because resume is idempotent), but it is
/// still reflected in this function's return value so the caller can exit non-zero.
///
/// # Errors
/// Returns the first [`ControllerError`] encountered while ensuring the schema, spawning, or
/// waiting on a worker. If any worker process exits non-zero that is also reported as an error,
/// after every worker has been allowed to finish.
pub async fn run_controller(
    exe: &Path,
    database_url: &str,
    config_path: &Path,
    endpoints: &[String],
    worker_count: usize,
    kind: InspectorKind,
    task: GlobalTask,
) -> Result<(), ControllerError> {
    if worker_count > endpoints.len() {
        warn!(
            worker_count,
            endpoint_count = endpoints.len(),
            "worker count exceeds endpoint count; endpoints will be shared"
        );
    }

    Gateway::connect(database_url).await?;

    let assignments: Vec<WorkerArgs> = match task {
        GlobalTask::BlockRange { a, b } => partition_block_range(a, b, worker_count)
            .into_iter()
            .enumerate()
            .map(|(index, (a, b))| WorkerArgs {
                index,
                endpoint: assign_endpoint(endpoints, index).to_owned(),
                kind,
                task: inspect::TaskSpec::BlockRange { a, b },
                database_url: database_url.to_owned(),
                config_path: config_path.to_owned(),
            })
            .collect(),
        GlobalTask::Contracts(contracts) => partition_contracts(&contracts, worker_count)
            .into_iter()
            .enumerate()
            .map(|(index, slice)| WorkerArgs {
                index,
                endpoint: assign_endpoint(endpoints, index).to_owned(),
                kind,
                task: inspect::TaskSpec::ContractList(slice),
                database_url: database_url.to_owned(),
                config_path: config_path.to_owned(),
            })
            .collect(),
    };

    let mut children = Vec::with_capacity(assignments.len());
    for args in &assignments {
        info!(index = args.index, endpoint = %args.endpoint, "spawning worker");
        children.push((args.index, spawn_worker(exe, args)?));
    }

    let mut failed_count = 0usize;
    for (index, mut child) in children {
        let status = child.wait().await.map_err(|source| ControllerError::Wait { index, source })?;
        if status.success() {
            info!(index, "worker exited successfully");
        } else {
            error!(index, code = status.code(), "worker exited with failure");
            failed_count += 1;
        }
    }

    if failed_count > 0 {
        return Err(ControllerError::WorkersFailed(failed_count));
    }

    Ok(())
}
