//! Result files written at the end of a run.
//!
//! These are the only deliverable of a run, so every failure here is
//! returned to the caller as a [`SubenumError::FileError`].

use crate::error::SubenumError;
use crate::types::ResolutionMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

fn file_error(path: &Path, action: &str, err: impl std::fmt::Display) -> SubenumError {
    SubenumError::file_error(path.to_string_lossy(), format!("{}: {}", action, err))
}

/// Write hostnames one per line, in the order given.
pub fn save_candidates<P: AsRef<Path>>(path: P, hosts: &[String]) -> Result<(), SubenumError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| file_error(path, "Failed to create file", e))?;
    let mut writer = BufWriter::new(file);

    for host in hosts {
        writeln!(writer, "{}", host).map_err(|e| file_error(path, "Failed to write", e))?;
    }

    writer
        .flush()
        .map_err(|e| file_error(path, "Failed to flush", e))
}

/// Write the resolution map as pretty-printed JSON.
pub fn save_resolved<P: AsRef<Path>>(path: P, resolved: &ResolutionMap) -> Result<(), SubenumError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| file_error(path, "Failed to create file", e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, resolved)
        .map_err(|e| file_error(path, "Failed to serialize results", e))?;
    writeln!(writer).map_err(|e| file_error(path, "Failed to write", e))?;

    writer
        .flush()
        .map_err(|e| file_error(path, "Failed to flush", e))
}

/// Read a resolution map previously written by [`save_resolved`].
pub fn load_resolved<P: AsRef<Path>>(path: P) -> Result<ResolutionMap, SubenumError> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).map_err(|e| file_error(path, "Failed to read file", e))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_candidates_one_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subdomains.txt");
        let hosts = vec!["api.example.com".to_string(), "www.example.com".to_string()];

        save_candidates(&path, &hosts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "api.example.com\nwww.example.com\n");
    }

    #[test]
    fn test_save_candidates_empty_list_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subdomains.txt");

        save_candidates(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_save_resolved_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resolved.json");

        let mut resolved = ResolutionMap::new();
        resolved.insert("a.example.com", vec!["1.2.3.4".to_string()]);

        save_resolved(&path, &resolved).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(raw, serde_json::json!({"a.example.com": ["1.2.3.4"]}));
        assert!(content.contains("\n  \"a.example.com\""), "pretty-printed");

        assert_eq!(load_resolved(&path).unwrap(), resolved);
    }

    #[test]
    fn test_save_resolved_empty_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resolved.json");

        save_resolved(&path, &ResolutionMap::new()).unwrap();
        assert!(load_resolved(&path).unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_path_is_a_file_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.txt");

        let err = save_candidates(&path, &["a.example.com".to_string()]).unwrap_err();
        assert!(err.is_fatal());
    }
}
