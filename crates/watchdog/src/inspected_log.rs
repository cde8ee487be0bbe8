//! Durable record of files already handled.
//!
//! A UTF-8 text file with one absolute path per line, append-only. Loaded
//! into a set at startup so repeated runs skip prior work. Once a path is
//! written it is never removed or rewritten; presence means "no further
//! inspection is needed for this exact path", not "the file's current
//! content still matches the policy". If content changes out of band the
//! log is stale and the file will not be re-detected. Accepted limitation.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for inspected-log operations.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to read inspected log: {0}")]
    Read(std::io::Error),

    #[error("Failed to append to inspected log: {0}")]
    Append(std::io::Error),
}

/// Append-only set of absolute paths already handled.
#[derive(Debug)]
pub struct InspectedLog {
    path: PathBuf,
    entries: HashSet<PathBuf>,
}

impl InspectedLog {
    /// Load the log from disk. A missing file is an empty log.
    ///
    /// Duplicate lines are tolerated; the in-memory view is a set.
    pub fn load(path: &Path) -> Result<Self, LogError> {
        let mut entries = HashSet::new();

        if path.exists() {
            let file = File::open(path).map_err(LogError::Read)?;
            for line in BufReader::new(file).lines() {
                let line = line.map_err(LogError::Read)?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    entries.insert(PathBuf::from(trimmed));
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Whether a path has already been handled.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains(path)
    }

    /// Number of distinct recorded paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a path to the durable log and the in-memory set.
    ///
    /// The line is written and flushed before this returns, so the fact
    /// survives a crash immediately afterward.
    pub fn append(&mut self, path: &Path) -> Result<(), LogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(LogError::Append)?;

        writeln!(file, "{}", path.display()).map_err(LogError::Append)?;
        file.flush().map_err(LogError::Append)?;

        self.entries.insert(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("inspected.log");

        let log = InspectedLog::load(&log_path).unwrap();
        assert!(log.is_empty());
        assert!(!log.contains(Path::new("/media/film.mkv")));
    }

    #[test]
    fn test_append_persists_and_is_visible() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("inspected.log");

        let mut log = InspectedLog::load(&log_path).unwrap();
        log.append(Path::new("/media/film.mkv")).unwrap();

        assert!(log.contains(Path::new("/media/film.mkv")));

        // Reload from disk and verify durability
        let reloaded = InspectedLog::load(&log_path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains(Path::new("/media/film.mkv")));
    }

    #[test]
    fn test_append_writes_exactly_one_line() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("inspected.log");

        let mut log = InspectedLog::load(&log_path).unwrap();
        log.append(Path::new("/media/film.mkv")).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        let matching = content
            .lines()
            .filter(|l| *l == "/media/film.mkv")
            .count();
        assert_eq!(matching, 1);
    }

    #[test]
    fn test_load_treats_duplicate_lines_as_set() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("inspected.log");

        fs::write(&log_path, "/media/a.mkv\n/media/a.mkv\n/media/b.mkv\n").unwrap();

        let log = InspectedLog::load(&log_path).unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.contains(Path::new("/media/a.mkv")));
        assert!(log.contains(Path::new("/media/b.mkv")));
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("inspected.log");

        fs::write(&log_path, "\n/media/a.mkv\n\n").unwrap();

        let log = InspectedLog::load(&log_path).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_entries_accumulate_across_runs() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("inspected.log");

        {
            let mut log = InspectedLog::load(&log_path).unwrap();
            log.append(Path::new("/media/a.mkv")).unwrap();
        }
        {
            let mut log = InspectedLog::load(&log_path).unwrap();
            assert!(log.contains(Path::new("/media/a.mkv")));
            log.append(Path::new("/media/b.mkv")).unwrap();
        }

        let log = InspectedLog::load(&log_path).unwrap();
        assert_eq!(log.len(), 2);
    }
}
