//! Entry point for the distributed block/contract inspector: runs as the controller (C7) when
//! invoked normally, or as a single worker (C6) when re-exec'd with the hidden worker
//! environment (see [`controller::worker_args_from_env`]).

mod args;
mod worker_main;

use anyhow::Context;
use args::{Cli, ValidatedTask};
use clap::Parser as _;
use controller::{
    init_controller_logging, load_endpoints, run_controller, worker_args_from_env, Config,
    GlobalTask,
};
use inspect::InspectorKind;

fn main() -> anyhow::Result<()> {
    if let Some(worker) = worker_args_from_env() {
        let runtime =
            tokio::runtime::Builder::new_current_thread().enable_all().build().context("failed to build worker runtime")?;
        return runtime.block_on(worker_main::run(worker));
    }

    let cli = Cli::parse();
    let task = cli.validate()?;

    init_controller_logging().context("failed to install logging")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build controller runtime")?;

    runtime.block_on(async move {
        let config = Config::load(&cli.config).context("failed to load configuration")?;
        let endpoints =
            load_endpoints(&config.rpc_hosts_ip_path).context("failed to load rpc endpoint list")?;

        std::fs::create_dir_all(&config.worker_logs_dir())
            .context("failed to create worker log directory")?;

        let exe = std::env::current_exe().context("failed to resolve current executable")?;

        let (kind, global_task) = match task {
            ValidatedTask::Tlsc { after, before } => {
                (InspectorKind::Tlsc, GlobalTask::BlockRange { a: after, b: before })
            }
            ValidatedTask::Block { after, before } => {
                (InspectorKind::Block, GlobalTask::BlockRange { a: after, b: before })
            }
            ValidatedTask::Contracts(contracts) => {
                (InspectorKind::Contract, GlobalTask::Contracts(contracts))
            }
        };

        run_controller(
            &exe,
            &cli.database_url,
            &cli.config,
            &endpoints,
            cli.para,
            kind,
            global_task,
        )
        .await
        .context("controller run failed")
    })
}
