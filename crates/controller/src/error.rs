//! Errors raised while loading configuration, spawning workers, or joining them.

use thiserror::Error;

/// An error from the controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The configuration file could not be read or parsed.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// The path that failed to load.
        path: String,
        /// The underlying parse error.
        source: ini::Error,
    },

    /// A required `[section] key` was missing from the configuration file.
    #[error("missing required config key [{section}] {key}")]
    MissingConfigKey {
        /// The section the key was expected under.
        section: &'static str,
        /// The missing key.
        key: &'static str,
    },

    /// An optional `[section] key` was present but not parseable as its expected type.
    #[error("invalid value for config key [{section}] {key}: {value:?}")]
    InvalidConfigValue {
        /// The section the key was found under.
        section: &'static str,
        /// The key whose value failed to parse.
        key: &'static str,
        /// The raw, unparseable value.
        value: String,
    },

    /// The RPC endpoint CSV file could not be read.
    #[error("failed to read endpoint list {path}: {source}")]
    EndpointsRead {
        /// The path that failed to load.
        path: String,
        /// The underlying CSV error.
        source: csv::Error,
    },

    /// The endpoint list was empty.
    #[error("endpoint list at {path} contained no entries")]
    NoEndpoints {
        /// The path that was empty.
        path: String,
    },

    /// A worker process could not be spawned.
    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        /// The worker's index.
        index: usize,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// A worker process could not be awaited.
    #[error("failed to wait for worker {index}: {source}")]
    Wait {
        /// The worker's index.
        index: usize,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// The inspector loop itself failed inside a worker process.
    #[error(transparent)]
    Inspect(#[from] inspect::InspectError),

    /// The persistence gateway failed to open or initialize its schema.
    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    /// The RPC client failed to build.
    #[error(transparent)]
    Rpc(#[from] rpc::RpcError),

    /// Setting up the logging subscriber failed (e.g. it was already installed).
    #[error("failed to install logging subscriber: {0}")]
    Logging(String),

    /// One or more worker processes exited non-zero; already-committed work from the rest is
    /// left in place.
    #[error("{0} worker(s) exited with a non-zero status")]
    WorkersFailed(usize),
}
