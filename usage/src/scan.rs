use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Extension of the sidecar files that carry a content identifier.
pub const META_EXTENSION: &str = "meta";

/// Editor-generated folders that never contain project content.
const SKIPPED_DIRS: [&str; 4] = ["Library", "Temp", "Logs", "obj"];

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Content identifier declared by a `.meta` sidecar (`guid: <hex>`).
pub fn meta_guid(contents: &str) -> Option<&str> {
    contents.lines().find_map(|line| {
        let guid = line.trim_start().strip_prefix("guid:")?.trim();
        (!guid.is_empty() && guid.chars().all(|c| c.is_ascii_alphanumeric())).then_some(guid)
    })
}

/// Collects the content identifiers of every file below `root`.
///
/// Unreadable entries are logged and skipped.
pub fn scan_project_identifiers(root: &Path) -> Result<BTreeSet<String>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("project directory not found: {}", root.display()),
        )
        .into());
    }
    info!("Scanning {:?} for content identifiers", root);

    let mut identifiers = BTreeSet::new();
    let mut meta_files = 0usize;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        let is_meta = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == META_EXTENSION);
        if !is_meta {
            continue;
        }
        meta_files += 1;
        match fs::read_to_string(entry.path()) {
            Ok(contents) => match meta_guid(&contents) {
                Some(guid) => {
                    identifiers.insert(guid.to_string());
                }
                None => debug!("No guid in {:?}", entry.path()),
            },
            Err(e) => warn!("Failed to read {:?}: {e}", entry.path()),
        }
    }

    info!(
        "Found {} identifiers in {} meta files",
        identifiers.len(),
        meta_files
    );
    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_meta_guid() {
        let meta = "fileFormatVersion: 2\nguid: 0a1b2c3d4e5f\nNativeFormatImporter:\n";
        assert_eq!(meta_guid(meta), Some("0a1b2c3d4e5f"));
        assert_eq!(meta_guid("fileFormatVersion: 2\n"), None);
        assert_eq!(meta_guid("guid:   \n"), None);
    }

    #[test]
    fn test_scan_skips_generated_folders() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Assets/Cars")).expect("Failed to create dirs");
        fs::create_dir_all(root.join("Library/Cache")).expect("Failed to create dirs");
        fs::write(root.join("Assets/Cars/car.prefab.meta"), "guid: aaa111\n").expect("write");
        fs::write(root.join("Assets/Cars.meta"), "guid: bbb222\n").expect("write");
        fs::write(root.join("Assets/Cars/car.prefab"), "guid: not-a-meta\n").expect("write");
        fs::write(root.join("Library/Cache/x.meta"), "guid: ccc333\n").expect("write");

        let identifiers = scan_project_identifiers(root).expect("Failed to scan");
        assert_eq!(
            identifiers.into_iter().collect::<Vec<_>>(),
            vec!["aaa111".to_string(), "bbb222".to_string()]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert!(scan_project_identifiers(&temp_dir.path().join("missing")).is_err());
    }
}
