use crate::error::{CatalogError, Result};
use crate::model::{FileEntry, FileRow, Package, PreviewState, SourceKind, TagTarget, UpdateState};
use crate::names::{normalize_location, safe_name};
use crate::projection::{self, FILE_COLUMN_COUNT, PACKAGE_COLUMN_COUNT, TAG_SEPARATOR};
use crate::store::CatalogStore;
use crate::value::SqlValue;
use rusqlite::types::{ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, Row, ToSql, params, params_from_iter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS package (
      id INTEGER PRIMARY KEY,
      display_name TEXT NOT NULL,
      safe_name TEXT NOT NULL,
      source INTEGER NOT NULL,
      parent_id INTEGER NOT NULL DEFAULT 0,
      exclude INTEGER NOT NULL DEFAULT 0,
      category TEXT,
      safe_category TEXT,
      publisher TEXT,
      safe_publisher TEXT,
      license TEXT,
      size INTEGER NOT NULL DEFAULT 0,
      foreign_id INTEGER NOT NULL DEFAULT 0,
      current_version TEXT,
      latest_version TEXT,
      update_state INTEGER NOT NULL DEFAULT 0,
      location TEXT,
      price REAL,
      bundled TEXT
    );

    CREATE TABLE IF NOT EXISTS file_entry (
      id INTEGER PRIMARY KEY,
      package_id INTEGER NOT NULL REFERENCES package(id),
      path TEXT NOT NULL,
      file_name TEXT NOT NULL,
      file_type TEXT NOT NULL,
      size INTEGER NOT NULL DEFAULT 0,
      width INTEGER,
      height INTEGER,
      length REAL,
      hue REAL,
      guid TEXT,
      preview_state INTEGER NOT NULL DEFAULT 0,
      description TEXT
    );

    CREATE TABLE IF NOT EXISTS tag (
      id INTEGER PRIMARY KEY,
      name TEXT NOT NULL UNIQUE,
      color TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS tag_assignment (
      id INTEGER PRIMARY KEY,
      tag_id INTEGER NOT NULL REFERENCES tag(id),
      target_kind INTEGER NOT NULL,
      target_id INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_file_entry_guid ON file_entry(guid);
    CREATE INDEX IF NOT EXISTS idx_file_entry_package ON file_entry(package_id);
    CREATE INDEX IF NOT EXISTS idx_package_parent ON package(parent_id);
    CREATE INDEX IF NOT EXISTS idx_tag_assignment_target ON tag_assignment(target_kind, target_id);
"#;

/// SQLite-backed catalog.
///
/// The connection sits behind a mutex so one catalog can be shared between
/// the query path and a running usage sweep.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CatalogError::Poisoned)
    }

    /// Inserts a package and returns its id. A positive `package.id` is kept,
    /// anything else lets the database assign one. Tags listed on the
    /// package are created and assigned as needed.
    pub fn insert_package(&self, package: &Package) -> Result<i64> {
        let bundled = if package.bundled.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&package.bundled)?)
        };
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO package (id, display_name, safe_name, source, parent_id, exclude, \
                 category, safe_category, publisher, safe_publisher, license, size, foreign_id, \
                 current_version, latest_version, update_state, location, price, bundled) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19)",
                params![
                    (package.id > 0).then_some(package.id),
                    package.display_name,
                    package.safe_name,
                    package.source.code(),
                    package.parent_id,
                    package.exclude,
                    package.category,
                    package.category.as_deref().map(safe_name),
                    package.publisher,
                    package.publisher.as_deref().map(safe_name),
                    package.license,
                    package.size,
                    package.foreign_id,
                    package.current_version,
                    package.latest_version,
                    package.update_state.code(),
                    package.location.as_deref().map(normalize_location),
                    package.price,
                    bundled,
                ],
            )?;
            conn.last_insert_rowid()
        };
        for tag in &package.tags {
            let tag_id = self.insert_tag(tag, "")?;
            self.assign_tag(tag_id, TagTarget::Package, id)?;
        }
        debug!(id, name = %package.display_name, "inserted package");
        Ok(id)
    }

    /// Inserts a file and returns its id.
    pub fn insert_file(&self, file: &FileEntry) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO file_entry (id, package_id, path, file_name, file_type, size, width, \
             height, length, hue, guid, preview_state, description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                (file.id > 0).then_some(file.id),
                file.package_id,
                file.path,
                file.file_name,
                file.file_type,
                file.size,
                file.width,
                file.height,
                file.length,
                file.hue,
                file.guid,
                file.preview.code(),
                file.description,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns the id of the tag with `name`, creating it if needed.
    pub fn insert_tag(&self, name: &str, color: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO tag (name, color) VALUES (?1, ?2)",
            params![name, color],
        )?;
        let id = conn.query_row("SELECT id FROM tag WHERE name = ?1", params![name], |row| {
            row.get(0)
        })?;
        Ok(id)
    }

    pub fn assign_tag(&self, tag_id: i64, target: TagTarget, target_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tag_assignment (tag_id, target_kind, target_id) VALUES (?1, ?2, ?3)",
            params![tag_id, target.code(), target_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// The complete, unfiltered package set with tags loaded.
    pub fn all_packages(&self) -> Result<Vec<Package>> {
        let sql = format!("{} ORDER BY p.id", projection::package_select());
        self.query_packages(&sql, &[])
    }
}

impl CatalogStore for SqliteCatalog {
    fn count(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        debug!(sql, params = params.len(), "count");
        let conn = self.conn()?;
        let count = conn.query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count)
    }

    fn query_files(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<FileRow>> {
        debug!(sql, params = params.len(), "query files");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(FileRow {
                    file: file_from_row(row, 0)?,
                    package: package_from_row(row, FILE_COLUMN_COUNT)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_packages(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Package>> {
        debug!(sql, params = params.len(), "query packages");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let has_tags = stmt.column_count() > PACKAGE_COLUMN_COUNT;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut package = package_from_row(row, 0)?;
                if has_tags {
                    let tags: Option<String> = row.get(PACKAGE_COLUMN_COUNT)?;
                    package.tags = split_tags(tags.as_deref());
                }
                Ok(package)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            SqlValue::Integer(value) => ToSqlOutput::Borrowed(ValueRef::Integer(*value)),
            SqlValue::Real(value) => ToSqlOutput::Borrowed(ValueRef::Real(*value)),
            SqlValue::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    let mut tags: Vec<String> = raw
        .unwrap_or_default()
        .split(TAG_SEPARATOR)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

fn coded<T>(row: &Row<'_>, idx: usize, decode: fn(i64) -> Option<T>) -> rusqlite::Result<T> {
    let code: i64 = row.get(idx)?;
    decode(code).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, code))
}

fn package_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Package> {
    let bundled_idx = offset + 16;
    let bundled: Option<String> = row.get(bundled_idx)?;
    let bundled = match bundled {
        Some(raw) if !raw.is_empty() => serde_json::from_str(&raw).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(bundled_idx, Type::Text, Box::new(err))
        })?,
        _ => Vec::new(),
    };
    Ok(Package {
        id: row.get(offset)?,
        display_name: row.get(offset + 1)?,
        safe_name: row.get(offset + 2)?,
        source: coded(row, offset + 3, SourceKind::from_code)?,
        parent_id: row.get(offset + 4)?,
        exclude: row.get(offset + 5)?,
        category: row.get(offset + 6)?,
        publisher: row.get(offset + 7)?,
        license: row.get(offset + 8)?,
        size: row.get(offset + 9)?,
        foreign_id: row.get(offset + 10)?,
        current_version: row.get(offset + 11)?,
        latest_version: row.get(offset + 12)?,
        update_state: coded(row, offset + 13, UpdateState::from_code)?,
        location: row.get(offset + 14)?,
        price: row.get(offset + 15)?,
        bundled,
        tags: Vec::new(),
    })
}

fn file_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<FileEntry> {
    Ok(FileEntry {
        id: row.get(offset)?,
        package_id: row.get(offset + 1)?,
        path: row.get(offset + 2)?,
        file_name: row.get(offset + 3)?,
        file_type: row.get(offset + 4)?,
        size: row.get(offset + 5)?,
        width: row.get(offset + 6)?,
        height: row.get(offset + 7)?,
        length: row.get(offset + 8)?,
        hue: row.get(offset + 9)?,
        guid: row.get(offset + 10)?,
        preview: coded(row, offset + 11, PreviewState::from_code)?,
        description: row.get(offset + 12)?,
    })
}
