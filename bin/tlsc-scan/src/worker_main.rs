//! The worker-process entry point: runs a single [`inspect::Inspector`] to completion against
//! the assignment encoded in the re-exec environment.

use controller::{init_worker_logging, Config, WorkerArgs};
use inspect::{Inspector, InspectorKind, TaskSpec};
use rpc::RpcClient;
use storage::Gateway;
use tracing::info;

/// Runs this process as a worker: opens its own RPC client and database session, runs its
/// assigned inspector to completion, and returns its exit code.
pub async fn run(worker: WorkerArgs) -> anyhow::Result<()> {
    let config = Config::load(&worker.config_path)?;
    let _log_guard = init_worker_logging(&config.worker_logs_dir(), worker.index)?;

    info!(
        index = worker.index,
        endpoint = %worker.endpoint,
        kind = ?worker.kind,
        "worker starting"
    );

    let rpc = RpcClient::with_timeout(
        worker.endpoint.clone(),
        std::time::Duration::from_secs(config.rpc_timeout_secs),
    )?;
    let gateway = Gateway::connect(&worker.database_url).await?;
    let inspector = Inspector::new(worker.kind, rpc, gateway);

    let task = match (&worker.kind, worker.task) {
        (InspectorKind::Tlsc | InspectorKind::Block, TaskSpec::BlockRange { a, b }) => {
            let resumed_a = inspector.resume_from(a, b).await?;
            TaskSpec::BlockRange { a: resumed_a, b }
        }
        (InspectorKind::Contract, contracts @ TaskSpec::ContractList(_)) => contracts,
        (kind, task) => anyhow::bail!("inspector kind {kind:?} is incompatible with task {task:?}"),
    };

    inspector.run(task).await?;

    info!(index = worker.index, "worker finished");
    Ok(())
}
