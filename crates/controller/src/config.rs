//! The startup configuration loader (§4.8): a key-value INI file read once and never reloaded.

use std::path::{Path, PathBuf};

use crate::error::ControllerError;

/// Default per-call RPC timeout, in seconds, when `[rpc] timeout_secs` is absent from the
/// configuration file.
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 500;

/// The parsed, immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the CSV file listing RPC endpoint IPs, one per line.
    pub rpc_hosts_ip_path: PathBuf,
    /// Directory controller-level logs are written under.
    pub logs_path: PathBuf,
    /// Subdirectory of `logs_path` that per-worker log files are written under.
    pub inspectors_log_path: PathBuf,
    /// Per-call RPC timeout, in seconds. Optional; defaults to [`DEFAULT_RPC_TIMEOUT_SECS`].
    pub rpc_timeout_secs: u64,
}

impl Config {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    /// Returns [`ControllerError::ConfigRead`] if the file can't be read or parsed as INI, or
    /// [`ControllerError::MissingConfigKey`] if a required key is absent.
    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let ini = ini::Ini::load_from_file(path).map_err(|source| ControllerError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        let rpc_hosts_ip_path = required(&ini, "paths", "rpc_hosts_ip_path")?;
        let logs_path = required(&ini, "logs", "logs_path")?;
        let inspectors_log_path = required(&ini, "logs", "inspectors_log_path")?;
        let rpc_timeout_secs = optional_u64(&ini, "rpc", "timeout_secs", DEFAULT_RPC_TIMEOUT_SECS)?;

        Ok(Self {
            rpc_hosts_ip_path: PathBuf::from(rpc_hosts_ip_path),
            logs_path: PathBuf::from(logs_path),
            inspectors_log_path: PathBuf::from(inspectors_log_path),
            rpc_timeout_secs,
        })
    }

    /// The full directory worker logs are written under: `logs_path/inspectors_log_path`.
    #[must_use]
    pub fn worker_logs_dir(&self) -> PathBuf {
        self.logs_path.join(&self.inspectors_log_path)
    }
}

fn required(
    ini: &ini::Ini,
    section: &'static str,
    key: &'static str,
) -> Result<String, ControllerError> {
    ini.get_from(Some(section), key)
        .map(str::to_owned)
        .ok_or(ControllerError::MissingConfigKey { section, key })
}

/// Reads an optional `[section] key` as a `u64`, falling back to `default` when absent.
fn optional_u64(
    ini: &ini::Ini,
    section: &'static str,
    key: &'static str,
    default: u64,
) -> Result<u64, ControllerError> {
    match ini.get_from(Some(section), key) {
        Some(raw) => raw.parse().map_err(|_| ControllerError::InvalidConfigValue {
            section,
            key,
            value: raw.to_owned(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_a_well_formed_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[paths]\nrpc_hosts_ip_path = endpoints.csv\n\n[logs]\nlogs_path = logs\ninspectors_log_path = workers\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.rpc_hosts_ip_path, PathBuf::from("endpoints.csv"));
        assert_eq!(config.worker_logs_dir(), PathBuf::from("logs/workers"));
        assert_eq!(config.rpc_timeout_secs, DEFAULT_RPC_TIMEOUT_SECS);
    }

    #[test]
    fn missing_key_is_a_startup_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[paths]\nrpc_hosts_ip_path = endpoints.csv\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ControllerError::MissingConfigKey { section: "logs", .. }));
    }

    #[test]
    fn rpc_timeout_secs_is_read_when_present() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[paths]\nrpc_hosts_ip_path = endpoints.csv\n\n[logs]\nlogs_path = logs\ninspectors_log_path = workers\n\n[rpc]\ntimeout_secs = 45\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.rpc_timeout_secs, 45);
    }

    #[test]
    fn malformed_rpc_timeout_secs_is_a_startup_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[paths]\nrpc_hosts_ip_path = endpoints.csv\n\n[logs]\nlogs_path = logs\ninspectors_log_path = workers\n\n[rpc]\ntimeout_secs = not-a-number\n"
        )
        .unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfigValue { section: "rpc", key: "timeout_secs", .. }));
    }
}
