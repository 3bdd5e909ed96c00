//! Partitioning, endpoint assignment, worker process orchestration, configuration loading, and
//! structured logging setup for the inspector controller.

mod config;
mod endpoints;
mod error;
mod logging;
mod orchestrator;
mod partition;
mod worker;

pub use config::Config;
pub use endpoints::{assign_endpoint, load_endpoints};
pub use error::ControllerError;
pub use logging::{init_controller_logging, init_worker_logging};
pub use orchestrator::{run_controller, GlobalTask};
pub use partition::{partition_block_range, partition_contracts};
pub use worker::{spawn_worker, worker_args_from_env, WorkerArgs};
