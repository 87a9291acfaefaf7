//! Column layouts shared by query builders and store implementations.
//!
//! Row mapping is positional, so every statement handed to
//! [`crate::CatalogStore`] starts from one of the `*_select` helpers here.

/// Package table with its alias.
pub const PACKAGE_TABLE: &str = "package p";

/// File table with its alias.
pub const FILE_TABLE: &str = "file_entry f";

/// Join from files to their owning package.
pub const FILE_PACKAGE_JOIN: &str = "INNER JOIN package p ON p.id = f.package_id";

pub const PACKAGE_COLUMNS: &str = "p.id, p.display_name, p.safe_name, p.source, p.parent_id, \
     p.exclude, p.category, p.publisher, p.license, p.size, p.foreign_id, p.current_version, \
     p.latest_version, p.update_state, p.location, p.price, p.bundled";

pub const PACKAGE_COLUMN_COUNT: usize = 17;

/// Tag names of a package, joined with the ASCII unit separator.
pub const PACKAGE_TAGS_COLUMN: &str = "(SELECT group_concat(t.name, char(31)) \
     FROM tag_assignment ta INNER JOIN tag t ON t.id = ta.tag_id \
     WHERE ta.target_kind = 0 AND ta.target_id = p.id) AS tags";

pub const TAG_SEPARATOR: char = '\u{1f}';

pub const FILE_COLUMNS: &str = "f.id, f.package_id, f.path, f.file_name, f.file_type, f.size, \
     f.width, f.height, f.length, f.hue, f.guid, f.preview_state, f.description";

pub const FILE_COLUMN_COUNT: usize = 13;

/// `SELECT ... FROM package p` producing rows for `query_packages`.
pub fn package_select() -> String {
    format!("SELECT {PACKAGE_COLUMNS}, {PACKAGE_TAGS_COLUMN} FROM {PACKAGE_TABLE}")
}

/// `SELECT ... FROM file_entry f INNER JOIN package p ...` producing rows for
/// `query_files`.
pub fn file_row_select() -> String {
    format!("SELECT {FILE_COLUMNS}, {PACKAGE_COLUMNS} FROM {FILE_TABLE} {FILE_PACKAGE_JOIN}")
}

/// `SELECT COUNT(*) FROM file_entry f INNER JOIN package p ...`.
pub fn file_count_select() -> String {
    format!("SELECT COUNT(*) FROM {FILE_TABLE} {FILE_PACKAGE_JOIN}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_counts_match_lists() {
        assert_eq!(PACKAGE_COLUMNS.split(',').count(), PACKAGE_COLUMN_COUNT);
        assert_eq!(FILE_COLUMNS.split(',').count(), FILE_COLUMN_COUNT);
    }
}
