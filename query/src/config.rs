use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column matched by `~` exact-substring phrases and by `+`/`-` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Path,
    FileName,
}

impl SearchField {
    pub fn column(self) -> &'static str {
        match self {
            SearchField::Path => "f.path",
            SearchField::FileName => "f.file_name",
        }
    }
}

/// Configuration for query compilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Hard ceiling for page sizes; 0 or larger requests are clamped to it
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Field used by exact-substring and `+`/`-` token searches
    #[serde(default = "default_search_field")]
    pub search_field: SearchField,

    /// Named groups of file types, e.g. "Images" -> ["png", "jpg", ...]
    #[serde(default = "default_type_groups")]
    pub type_groups: BTreeMap<String, Vec<String>>,

    /// Honour `=` phrases by splicing them into the WHERE clause verbatim.
    /// Only for trusted, local input.
    #[serde(default)]
    pub allow_raw_predicates: bool,
}

fn default_max_page_size() -> u32 {
    50_000
}

fn default_search_field() -> SearchField {
    SearchField::Path
}

fn default_type_groups() -> BTreeMap<String, Vec<String>> {
    let groups: [(&str, &[&str]); 11] = [
        ("Animations", &["anim", "controller", "overridecontroller", "mask"]),
        ("Audio", &["wav", "mp3", "ogg", "aiff", "aif", "flac"]),
        ("Documents", &["pdf", "txt", "md", "rtf", "doc", "docx"]),
        ("Fonts", &["ttf", "otf", "fnt", "fontsettings"]),
        (
            "Images",
            &[
                "png", "jpg", "jpeg", "tga", "psd", "bmp", "gif", "tif", "tiff", "exr", "hdr",
            ],
        ),
        ("Materials", &["mat", "physicmaterial", "physicsmaterial2d"]),
        ("Models", &["fbx", "obj", "blend", "dae", "3ds", "max"]),
        ("Prefabs", &["prefab"]),
        ("Scripts", &["cs", "js", "dll"]),
        ("Shaders", &["shader", "shadergraph", "shadersubgraph", "cginc", "hlsl", "compute"]),
        ("Videos", &["mp4", "mov", "avi", "webm", "ogv"]),
    ];
    groups
        .into_iter()
        .map(|(name, types)| {
            (
                name.to_string(),
                types.iter().map(|t| (*t).to_string()).collect(),
            )
        })
        .collect()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            search_field: default_search_field(),
            type_groups: default_type_groups(),
            allow_raw_predicates: false,
        }
    }
}

impl QueryConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_page_size == 0 {
            return Err("max_page_size must be > 0".to_string());
        }

        for (name, types) in &self.type_groups {
            if types.iter().any(|t| t.trim().is_empty()) {
                return Err(format!("type group '{name}' contains an empty type"));
            }
        }

        Ok(())
    }

    /// Resolves a type selector to the list of file types it stands for.
    ///
    /// Group names match case-insensitively; anything else is taken as a
    /// single file type.
    pub fn resolve_types(&self, selector: &str) -> Vec<String> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Vec::new();
        }
        let group = self
            .type_groups
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(selector));
        match group {
            Some((_, types)) => types.iter().map(|t| t.trim().to_ascii_lowercase()).collect(),
            None => vec![selector.trim_start_matches('.').to_ascii_lowercase()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        let config = QueryConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.allow_raw_predicates);
        assert_eq!(config.search_field, SearchField::Path);
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let config = QueryConfig {
            max_page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_types() {
        let config = QueryConfig::default();
        assert_eq!(config.resolve_types("prefabs"), vec!["prefab".to_string()]);
        assert_eq!(config.resolve_types(".PNG"), vec!["png".to_string()]);
        assert!(config.resolve_types("Audio").len() > 1);
        assert!(config.resolve_types("  ").is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: QueryConfig = serde_json::from_str("{\"allow_raw_predicates\": true}").unwrap();
        assert!(config.allow_raw_predicates);
        assert_eq!(config.max_page_size, 50_000);
        assert!(config.type_groups.contains_key("Prefabs"));
    }
}
