use crate::names::safe_name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an indexed package came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StorePackage,
    RegistryPackage,
    CustomPackage,
    Directory,
    Archive,
    AssetManager,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::StorePackage,
        SourceKind::RegistryPackage,
        SourceKind::CustomPackage,
        SourceKind::Directory,
        SourceKind::Archive,
        SourceKind::AssetManager,
    ];

    /// Integer code persisted in the catalog.
    pub fn code(self) -> i64 {
        match self {
            SourceKind::StorePackage => 0,
            SourceKind::RegistryPackage => 1,
            SourceKind::CustomPackage => 2,
            SourceKind::Directory => 3,
            SourceKind::Archive => 4,
            SourceKind::AssetManager => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::StorePackage => "store_package",
            SourceKind::RegistryPackage => "registry_package",
            SourceKind::CustomPackage => "custom_package",
            SourceKind::Directory => "directory",
            SourceKind::Archive => "archive",
            SourceKind::AssetManager => "asset_manager",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preview image state of a file.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PreviewState {
    #[default]
    None,
    Provided,
    Custom,
    Error,
    NotApplicable,
    Redo,
}

impl PreviewState {
    pub const ALL: [PreviewState; 6] = [
        PreviewState::None,
        PreviewState::Provided,
        PreviewState::Custom,
        PreviewState::Error,
        PreviewState::NotApplicable,
        PreviewState::Redo,
    ];

    pub fn code(self) -> i64 {
        match self {
            PreviewState::None => 0,
            PreviewState::Provided => 1,
            PreviewState::Custom => 2,
            PreviewState::Error => 3,
            PreviewState::NotApplicable => 4,
            PreviewState::Redo => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }
}

/// Update status of a package relative to its upstream source.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdateState {
    #[default]
    Unknown,
    Current,
    Outdated,
    Deprecated,
    Unavailable,
}

impl UpdateState {
    pub const ALL: [UpdateState; 5] = [
        UpdateState::Unknown,
        UpdateState::Current,
        UpdateState::Outdated,
        UpdateState::Deprecated,
        UpdateState::Unavailable,
    ];

    pub fn code(self) -> i64 {
        match self {
            UpdateState::Unknown => 0,
            UpdateState::Current => 1,
            UpdateState::Outdated => 2,
            UpdateState::Deprecated => 3,
            UpdateState::Unavailable => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    /// Human readable label, used as the group name when grouping by state.
    pub fn label(self) -> &'static str {
        match self {
            UpdateState::Unknown => "Unknown",
            UpdateState::Current => "Up to date",
            UpdateState::Outdated => "Update available",
            UpdateState::Deprecated => "Deprecated",
            UpdateState::Unavailable => "Unavailable",
        }
    }
}

/// What a row of the `tag_assignment` table points at.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagTarget {
    Package,
    File,
}

impl TagTarget {
    pub fn code(self) -> i64 {
        match self {
            TagTarget::Package => 0,
            TagTarget::File => 1,
        }
    }
}

/// One indexed distributable unit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: i64,
    pub display_name: String,
    /// Normalized name, stable across re-indexing; used as join key.
    pub safe_name: String,
    pub source: SourceKind,
    /// 0 for top-level packages, otherwise the id of the owning package.
    pub parent_id: i64,
    pub exclude: bool,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub license: Option<String>,
    pub size: i64,
    /// Identifier in the originating marketplace, 0 if none.
    pub foreign_id: i64,
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
    pub update_state: UpdateState,
    /// Folder or archive path the package was indexed from.
    pub location: Option<String>,
    pub price: Option<f64>,
    /// Safe names of the packages a feature bundle pulls in.
    #[serde(default)]
    pub bundled: Vec<String>,
    /// Names of the tags assigned to this package.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Package {
    pub fn new(id: i64, display_name: impl Into<String>, source: SourceKind) -> Self {
        let display_name = display_name.into();
        Self {
            id,
            safe_name: safe_name(&display_name),
            display_name,
            source,
            parent_id: 0,
            exclude: false,
            category: None,
            publisher: None,
            license: None,
            size: 0,
            foreign_id: 0,
            current_version: None,
            latest_version: None,
            update_state: UpdateState::Unknown,
            location: None,
            price: None,
            bundled: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| (*tag).to_string()).collect();
        self
    }

    pub fn is_sub_package(&self) -> bool {
        self.parent_id > 0
    }

    pub fn is_feature_bundle(&self) -> bool {
        !self.bundled.is_empty()
    }

    /// Placeholder packages synthesized for dependencies that have no
    /// catalog row carry non-positive ids.
    pub fn is_virtual(&self) -> bool {
        self.id <= 0
    }
}

/// One file inside a package.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub id: i64,
    pub package_id: i64,
    pub path: String,
    pub file_name: String,
    /// Lowercase extension without the dot.
    pub file_type: String,
    pub size: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub length: Option<f64>,
    pub hue: Option<f64>,
    /// Content identifier. Not unique across packages.
    pub guid: Option<String>,
    pub preview: PreviewState,
    pub description: Option<String>,
}

impl FileEntry {
    /// Builds an entry from a package relative path, deriving name and type.
    pub fn new(package_id: i64, path: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let file_name = path.rsplit('/').next().unwrap_or_default().to_string();
        let file_type = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            id: 0,
            package_id,
            path,
            file_name,
            file_type,
            size: 0,
            width: None,
            height: None,
            length: None,
            hue: None,
            guid: None,
            preview: PreviewState::None,
            description: None,
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }
}

/// A file joined with the package that owns it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileRow {
    pub file: FileEntry,
    pub package: Package,
}
