//! CLI surface for the inspector controller binary (§4.10, §6).

use std::path::PathBuf;

use clap::Parser;

/// Distributed block/contract inspector controller.
///
/// Invoked without the hidden worker environment, this process partitions the requested task
/// across `--para` worker processes and awaits them. Each worker is this same binary, re-exec'd
/// internally; the worker environment variables are not part of this CLI surface.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Block number to start from (inclusive). Required unless `--many-contracts` is set.
    #[arg(short, long)]
    pub after: Option<i64>,

    /// Block number to end with (exclusive). Required unless `--many-contracts` is set.
    #[arg(short, long)]
    pub before: Option<i64>,

    /// Maximum number of parallel worker processes.
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub para: usize,

    /// Run the contract-info inspector over an explicit list of addresses instead of a block
    /// range.
    #[arg(long, conflicts_with = "many_blocks", requires = "contracts_path")]
    pub many_contracts: bool,

    /// Run the block-economics inspector instead of the default TLSC discovery inspector.
    #[arg(long, conflicts_with = "many_contracts")]
    pub many_blocks: bool,

    /// Path to a newline-delimited file of contract addresses, required by `--many-contracts`.
    #[arg(long)]
    pub contracts_path: Option<PathBuf>,

    /// Path to the INI configuration file (§4.8).
    #[arg(long, default_value = "config.ini")]
    pub config: PathBuf,

    /// Database connection string the gateway opens sessions against.
    #[arg(long, default_value = "sqlite://inspector.db")]
    pub database_url: String,
}

/// A validated, normalized view of [`Cli`]'s flags.
#[derive(Debug, Clone)]
pub enum ValidatedTask {
    /// Inspect the block range `[after, before)` with the TLSC discovery inspector.
    Tlsc {
        /// Inclusive lower bound.
        after: i64,
        /// Exclusive upper bound.
        before: i64,
    },
    /// Inspect the block range `[after, before)` with the block-economics inspector.
    Block {
        /// Inclusive lower bound.
        after: i64,
        /// Exclusive upper bound.
        before: i64,
    },
    /// Inspect the contract addresses loaded from `contracts_path`.
    Contracts(Vec<String>),
}

/// An error produced while validating [`Cli`]'s flags.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// `--after`/`--before` were not both supplied for a block-range task.
    #[error("--after and --before are both required unless --many-contracts is set")]
    MissingRange,

    /// `after >= before`.
    #[error("--after ({after}) must be strictly less than --before ({before})")]
    RangeNotIncreasing {
        /// The supplied `--after`.
        after: i64,
        /// The supplied `--before`.
        before: i64,
    },

    /// A negative block bound was supplied.
    #[error("block bounds must be non-negative, got {0}")]
    NegativeBound(i64),

    /// `--para` was zero.
    #[error("--para must be greater than zero")]
    ZeroConcurrency,

    /// `--contracts-path` could not be read.
    #[error("failed to read --contracts-path {path}: {source}")]
    ContractsRead {
        /// The path that failed to load.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Cli {
    /// Validates the parsed arguments and resolves them into a [`ValidatedTask`].
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `--para` is zero, the range is malformed, or the
    /// contracts file can't be read.
    pub fn validate(&self) -> Result<ValidatedTask, ValidationError> {
        if self.para == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }

        if self.many_contracts {
            let path = self.contracts_path.as_ref().expect("clap enforces contracts_path");
            let contents = std::fs::read_to_string(path).map_err(|source| {
                ValidationError::ContractsRead { path: path.display().to_string(), source }
            })?;
            let contracts =
                contents.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_owned).collect();
            return Ok(ValidatedTask::Contracts(contracts));
        }

        let (after, before) = match (self.after, self.before) {
            (Some(after), Some(before)) => (after, before),
            _ => return Err(ValidationError::MissingRange),
        };

        if after < 0 {
            return Err(ValidationError::NegativeBound(after));
        }
        if before < 0 {
            return Err(ValidationError::NegativeBound(before));
        }
        if after >= before {
            return Err(ValidationError::RangeNotIncreasing { after, before });
        }

        if self.many_blocks {
            Ok(ValidatedTask::Block { after, before })
        } else {
            Ok(ValidatedTask::Tlsc { after, before })
        }
    }
}
