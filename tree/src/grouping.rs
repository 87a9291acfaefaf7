use assetdex_catalog::{Package, normalize_location};
use serde::{Deserialize, Serialize};

/// Label of the group holding packages that have no value for the key.
pub const NONE_GROUP: &str = "-none-";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    #[default]
    None,
    Category,
    Publisher,
    Tag,
    State,
    Location,
}

/// Path of group labels a package sits under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GroupPath {
    pub segments: Vec<String>,
    pub is_none: bool,
}

impl GroupPath {
    fn none() -> Self {
        Self {
            segments: vec![NONE_GROUP.to_string()],
            is_none: true,
        }
    }

    fn from_segments(segments: Vec<String>) -> Self {
        if segments.is_empty() {
            Self::none()
        } else {
            Self {
                segments,
                is_none: false,
            }
        }
    }

    /// Sort key: the none group first, then segments case-insensitively.
    pub fn sort_key(&self) -> (bool, Vec<String>) {
        (
            !self.is_none,
            self.segments.iter().map(|s| s.to_lowercase()).collect(),
        )
    }
}

fn split_path(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split('/')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn single(value: Option<&str>) -> Vec<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| vec![v.to_string()])
        .unwrap_or_default()
}

impl Grouping {
    /// Group paths for `package`; tag grouping yields one path per tag.
    pub(crate) fn paths(self, package: &Package) -> Vec<GroupPath> {
        match self {
            Grouping::None => Vec::new(),
            Grouping::Category => vec![GroupPath::from_segments(split_path(
                package.category.as_deref(),
            ))],
            Grouping::Publisher => vec![GroupPath::from_segments(single(
                package.publisher.as_deref(),
            ))],
            Grouping::Tag => {
                let mut tags: Vec<&str> = package
                    .tags
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .collect();
                tags.sort_by_cached_key(|tag| tag.to_lowercase());
                tags.dedup_by_key(|tag| tag.to_lowercase());
                if tags.is_empty() {
                    vec![GroupPath::none()]
                } else {
                    tags.into_iter()
                        .map(|tag| GroupPath::from_segments(vec![tag.to_string()]))
                        .collect()
                }
            }
            Grouping::State => vec![GroupPath::from_segments(vec![
                package.update_state.label().to_string(),
            ])],
            Grouping::Location => {
                let location = package.location.as_deref().map(normalize_location);
                vec![GroupPath::from_segments(split_path(location.as_deref()))]
            }
        }
    }
}
