//! Loading the RPC endpoint list: a header-less CSV of one `ip` per line.

use std::path::Path;

use crate::error::ControllerError;

/// Reads `path` as a header-less, single-column CSV of endpoint IPs and returns the
/// corresponding JSON-RPC URLs.
///
/// # Errors
/// Returns [`ControllerError::EndpointsRead`] on an I/O or malformed-CSV failure, or
/// [`ControllerError::NoEndpoints`] if the file contained no rows.
pub fn load_endpoints(path: &Path) -> Result<Vec<String>, ControllerError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|source| ControllerError::EndpointsRead {
            path: path.display().to_string(),
            source,
        })?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ControllerError::EndpointsRead {
            path: path.display().to_string(),
            source,
        })?;
        if let Some(ip) = record.get(0) {
            urls.push(format!("http://{ip}:8545/"));
        }
    }

    if urls.is_empty() {
        return Err(ControllerError::NoEndpoints { path: path.display().to_string() });
    }

    Ok(urls)
}

/// Assigns worker `index` its endpoint by round-robin over `endpoints`, as `endpoints[index %
/// endpoints.len()]`.
///
/// # Panics
/// Panics if `endpoints` is empty; callers are expected to have already rejected that via
/// [`load_endpoints`]'s [`ControllerError::NoEndpoints`].
#[must_use]
pub fn assign_endpoint(endpoints: &[String], index: usize) -> &str {
    &endpoints[index % endpoints.len()]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_endpoints_and_formats_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.1\n10.0.0.2\n").unwrap();

        let endpoints = load_endpoints(file.path()).unwrap();
        assert_eq!(endpoints, vec!["http://10.0.0.1:8545/", "http://10.0.0.2:8545/"]);
    }

    #[test]
    fn round_robins_when_workers_outnumber_endpoints() {
        let endpoints = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(assign_endpoint(&endpoints, 0), "a");
        assert_eq!(assign_endpoint(&endpoints, 1), "b");
        assert_eq!(assign_endpoint(&endpoints, 2), "a");
    }
}
