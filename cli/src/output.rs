use assetdex_catalog::SourceKind;
use assetdex_tree::Grouping;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Store,
    Registry,
    Custom,
    Directory,
    Archive,
    AssetManager,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Store => SourceKind::StorePackage,
            SourceArg::Registry => SourceKind::RegistryPackage,
            SourceArg::Custom => SourceKind::CustomPackage,
            SourceArg::Directory => SourceKind::Directory,
            SourceArg::Archive => SourceKind::Archive,
            SourceArg::AssetManager => SourceKind::AssetManager,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupArg {
    None,
    Category,
    Publisher,
    Tag,
    State,
    Location,
}

impl From<GroupArg> for Grouping {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::None => Grouping::None,
            GroupArg::Category => Grouping::Category,
            GroupArg::Publisher => Grouping::Publisher,
            GroupArg::Tag => Grouping::Tag,
            GroupArg::State => Grouping::State,
            GroupArg::Location => Grouping::Location,
        }
    }
}

/// Byte count with a binary unit, e.g. `1.5 KB`.
pub fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
