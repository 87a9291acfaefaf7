use crate::error::{Result, UsageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A registry package the consuming project has installed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledDependency {
    pub name: String,
    pub version: String,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// Location of the dependency manifest inside a project.
pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join("Packages").join("manifest.json")
}

/// Local folders, tarballs and git URLs are not registry packages.
fn is_registry_version(version: &str) -> bool {
    let version = version.trim();
    !(version.is_empty()
        || version.starts_with("file:")
        || version.starts_with("git")
        || version.contains("://")
        || version.ends_with(".git"))
}

pub fn parse_manifest(json: &str) -> serde_json::Result<Vec<InstalledDependency>> {
    let manifest: Manifest = serde_json::from_str(json)?;
    Ok(manifest
        .dependencies
        .into_iter()
        .filter(|(_, version)| is_registry_version(version))
        .map(|(name, version)| InstalledDependency { name, version })
        .collect())
}

pub fn read_manifest(path: &Path) -> Result<Vec<InstalledDependency>> {
    let json = fs::read_to_string(path)?;
    parse_manifest(&json).map_err(|source| UsageError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_non_registry_references() {
        let json = r#"{
            "dependencies": {
                "com.example.physics": "1.2.0",
                "com.example.local": "file:../LocalPackages/local",
                "com.example.remote": "https://github.com/example/remote.git",
                "com.example.ssh": "git@github.com:example/ssh.git"
            },
            "scopedRegistries": []
        }"#;
        assert_eq!(
            parse_manifest(json).expect("Failed to parse"),
            vec![InstalledDependency {
                name: "com.example.physics".to_string(),
                version: "1.2.0".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_dependencies_table() {
        assert!(parse_manifest("{}").expect("Failed to parse").is_empty());
    }

    #[test]
    fn test_read_manifest_reports_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = manifest_path(temp_dir.path());
        fs::create_dir_all(path.parent().expect("has parent")).expect("create dir");
        fs::write(&path, "{ not json").expect("write");

        let err = read_manifest(&path).expect_err("malformed manifest");
        assert!(matches!(err, UsageError::Manifest { .. }));
        assert!(err.to_string().contains("manifest.json"));
    }
}
