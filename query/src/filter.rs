use assetdex_catalog::{PreviewState, SourceKind};
use serde::{Deserialize, Serialize};

/// Snapshot of every active facet for one file search.
///
/// Built by the caller for each query and passed by value or reference;
/// nothing in this crate keeps a "current" filter around.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterState {
    /// Free text; a leading `=` selects raw predicate mode, `~` exact
    /// substring mode, anything else token mode.
    pub phrase: String,
    /// Also return files of packages flagged as excluded.
    pub include_excluded: bool,
    /// Type group name ("Images") or a single file type ("png").
    pub file_type: Option<String>,
    pub package_id: Option<i64>,
    pub publisher: Option<String>,
    pub category: Option<String>,
    pub source: Option<SourceKind>,
    pub package_tag: TagSelector,
    pub file_tag: TagSelector,
    pub preview: PreviewSelector,
    pub width: RangeFilter,
    pub height: RangeFilter,
    /// Seconds.
    pub length: RangeFilter,
    /// Kilobytes.
    pub size: RangeFilter,
    pub sort: SortField,
    pub descending: bool,
    /// 1-based page number; 0 is treated as 1.
    pub page: u32,
    /// 0 means "as many as allowed".
    pub page_size: u32,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TagSelector {
    #[default]
    Any,
    Untagged,
    Tag(i64),
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreviewSelector {
    #[default]
    Any,
    /// Provided or custom previews.
    Available,
    /// No preview yet, failed, or scheduled for regeneration.
    Missing,
    State(PreviewState),
}

/// A numeric bound as typed by the user. Values that do not parse are
/// ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RangeFilter {
    pub value: Option<String>,
    /// `true` turns the bound into an upper limit (`<=`), `false` into a
    /// lower limit (`>=`).
    pub is_max: bool,
}

impl RangeFilter {
    pub fn at_least(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            is_max: false,
        }
    }

    pub fn at_most(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            is_max: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Path,
    FileName,
    FileType,
    Size,
    Width,
    Height,
    Length,
    Package,
    Category,
    Publisher,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Path => "f.path",
            SortField::FileName => "f.file_name",
            SortField::FileType => "f.file_type",
            SortField::Size => "f.size",
            SortField::Width => "f.width",
            SortField::Height => "f.height",
            SortField::Length => "f.length",
            SortField::Package => "p.display_name",
            SortField::Category => "p.category",
            SortField::Publisher => "p.publisher",
        }
    }
}
