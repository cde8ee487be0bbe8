//! Scanner: discovers candidate media files in the configured libraries.

use std::env;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Checks whether a file name matches one of the configured extensions
/// (entries include the leading dot; matching is case-insensitive).
pub fn is_media_file(path: &Path, extensions: &[String]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_lowercase(),
        None => return false,
    };
    extensions
        .iter()
        .any(|ext| name.ends_with(&ext.to_lowercase()))
}

/// Replaces a leading `~` component with the home directory, when one is
/// known.
fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Expands `~` and anchors relative roots at the current directory.
///
/// The inspected log stores one absolute path per line, so every path the
/// scanner yields must be absolute regardless of how the root was
/// configured or which directory the process was started from.
fn normalize_root(root: &Path) -> PathBuf {
    let home = env::var_os("HOME").map(PathBuf::from);
    let expanded = expand_tilde(root, home.as_deref());
    if expanded.is_absolute() {
        return expanded;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(expanded),
        Err(_) => expanded,
    }
}

/// Recursively walks the media directories and collects files with a
/// recognized extension. Roots are normalized to absolute paths first;
/// missing roots are skipped with a warning. The scanner keeps no state
/// of its own.
pub fn scan_media_files(roots: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in roots {
        let root = normalize_root(root);
        if !root.is_dir() {
            log::warn!("Media directory not found, skipping: {}", root.display());
            continue;
        }

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if is_media_file(path, extensions) {
                files.push(path.to_path_buf());
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn default_extensions() -> Vec<String> {
        [".mkv", ".mp4", ".avi", ".mov", ".webm"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_is_media_file_case_insensitive() {
        let exts = default_extensions();
        assert!(is_media_file(Path::new("/media/movie.mkv"), &exts));
        assert!(is_media_file(Path::new("/media/movie.MKV"), &exts));
        assert!(is_media_file(Path::new("/media/movie.Mp4"), &exts));
        assert!(is_media_file(Path::new("/media/movie.webm"), &exts));
        assert!(!is_media_file(Path::new("/media/movie.txt"), &exts));
        assert!(!is_media_file(Path::new("/media/movie.srt"), &exts));
        assert!(!is_media_file(Path::new("/media/movie"), &exts));
    }

    #[test]
    fn test_scan_finds_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("season-01");
        fs::create_dir_all(&nested).unwrap();

        let top = temp_dir.path().join("film.mkv");
        let deep = nested.join("episode.mp4");
        let ignored = nested.join("notes.txt");
        File::create(&top).unwrap();
        File::create(&deep).unwrap();
        File::create(&ignored).unwrap();

        let mut found = scan_media_files(&[temp_dir.path().to_path_buf()], &default_extensions());
        found.sort();

        assert_eq!(found.len(), 2);
        assert!(found.contains(&top));
        assert!(found.contains(&deep));
    }

    #[test]
    fn test_scan_skips_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");
        let existing = temp_dir.path().join("lib");
        fs::create_dir_all(&existing).unwrap();
        let file = existing.join("a.mkv");
        File::create(&file).unwrap();

        let found = scan_media_files(&[missing, existing], &default_extensions());
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn test_expand_tilde_joins_home() {
        assert_eq!(
            expand_tilde(Path::new("~/media"), Some(Path::new("/home/user"))),
            PathBuf::from("/home/user/media")
        );
        // No home known: left untouched.
        assert_eq!(expand_tilde(Path::new("~/media"), None), PathBuf::from("~/media"));
        // No tilde: left untouched.
        assert_eq!(
            expand_tilde(Path::new("/srv/media"), Some(Path::new("/home/user"))),
            PathBuf::from("/srv/media")
        );
    }

    #[test]
    fn test_normalize_root_anchors_relative_paths() {
        let normalized = normalize_root(Path::new("library"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("library"));

        assert_eq!(
            normalize_root(Path::new("/srv/media")),
            PathBuf::from("/srv/media")
        );
    }

    #[test]
    fn test_relative_root_yields_absolute_paths() {
        let fixture = format!("scan-fixture-{}", std::process::id());
        let dir = std::env::current_dir().unwrap().join(&fixture);
        fs::create_dir_all(&dir).unwrap();
        File::create(dir.join("a.mkv")).unwrap();

        let found = scan_media_files(&[PathBuf::from(&fixture)], &default_extensions());
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found, vec![dir.join("a.mkv")]);
        assert!(found[0].is_absolute());
    }

    #[test]
    fn test_scan_multiple_roots() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        File::create(a.path().join("one.mkv")).unwrap();
        File::create(b.path().join("two.avi")).unwrap();

        let found = scan_media_files(
            &[a.path().to_path_buf(), b.path().to_path_buf()],
            &default_extensions(),
        );
        assert_eq!(found.len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // A path is a candidate iff its extension is in the allow-list,
        // regardless of case.
        #[test]
        fn prop_extension_filtering(
            basename in "[a-zA-Z0-9_-]{1,20}",
            ext in prop_oneof![
                Just("mkv"), Just("MKV"), Just("Mkv"),
                Just("mp4"), Just("MP4"),
                Just("avi"), Just("AVI"),
                Just("mov"), Just("MOV"),
                Just("webm"), Just("WEBM"),
                Just("txt"), Just("jpg"), Just("srt"), Just("nfo"),
            ],
        ) {
            let path = PathBuf::from(format!("/media/{}.{}", basename, ext));
            let expected = matches!(
                ext.to_lowercase().as_str(),
                "mkv" | "mp4" | "avi" | "mov" | "webm"
            );
            prop_assert_eq!(is_media_file(&path, &default_extensions()), expected);
        }
    }
}
