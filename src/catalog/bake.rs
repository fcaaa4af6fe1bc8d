/// Taxonomy ingestion: load the COICOP CSV into a fresh category database.
///
/// Baking always replaces the whole database. Rows go into the structured
/// `category` table and into both full-text indexes, with the FTS `rowid`
/// pinned to the category `id` so the query builder's
/// `id IN (SELECT rowid ...)` join is exact.
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rusqlite::params;
use serde::Deserialize;

use super::errors::CatalogError;
use super::query::{CATEGORY_TABLE, EXCLUDES_FTS_TABLE, MAIN_FTS_TABLE};
use super::store::Store;

/// One CSV record. Missing text columns read as empty; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CategoryRecord {
    code: String,
    title: String,
    #[serde(default)]
    intro: String,
    #[serde(default)]
    includes: String,
    #[serde(default, rename = "alsoIncludes")]
    also_includes: String,
    #[serde(default)]
    excludes: String,
}

/// Outcome of a bake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeSummary {
    /// Where the database was written.
    pub db_path: PathBuf,
    /// Number of categories loaded.
    pub categories: usize,
}

impl Store {
    /// Create the category table, its code index and both full-text indexes.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if any statement fails (e.g. the tables
    /// already exist).
    pub fn create_schema(&self) -> Result<(), CatalogError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE {CATEGORY_TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT,
                title TEXT,
                intro TEXT,
                includes TEXT,
                alsoIncludes TEXT,
                excludes TEXT,
                level INTEGER DEFAULT NULL
            );
            CREATE INDEX category_code_idx ON {CATEGORY_TABLE} (code);
            CREATE VIRTUAL TABLE {MAIN_FTS_TABLE} USING fts5(title, intro, includes, alsoIncludes);
            CREATE VIRTUAL TABLE {EXCLUDES_FTS_TABLE} USING fts5(excludes);"
        ))?;
        Ok(())
    }

    /// Load every CSV record in one transaction and derive `level`.
    ///
    /// Returns the number of categories loaded.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Csv` for a malformed record (nothing is
    /// committed) or `CatalogError::Store` on a write failure.
    pub fn load_csv<R: Read>(&mut self, input: R) -> Result<usize, CatalogError> {
        let mut reader = csv::Reader::from_reader(input);
        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut insert_category = tx.prepare(&format!(
                "INSERT INTO {CATEGORY_TABLE} (code, title, intro, includes, alsoIncludes, excludes) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ))?;
            let mut insert_main = tx.prepare(&format!(
                "INSERT INTO {MAIN_FTS_TABLE} (rowid, title, intro, includes, alsoIncludes) \
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ))?;
            let mut insert_excludes = tx.prepare(&format!(
                "INSERT INTO {EXCLUDES_FTS_TABLE} (rowid, excludes) VALUES (?1, ?2)"
            ))?;

            for record in reader.deserialize() {
                let r: CategoryRecord = record?;
                insert_category.execute(params![
                    r.code,
                    r.title,
                    r.intro,
                    r.includes,
                    r.also_includes,
                    r.excludes
                ])?;
                let id = tx.last_insert_rowid();
                insert_main.execute(params![id, r.title, r.intro, r.includes, r.also_includes])?;
                insert_excludes.execute(params![id, r.excludes])?;
                count += 1;
            }
        }
        tx.execute(
            &format!(
                "UPDATE {CATEGORY_TABLE} SET level = (LENGTH(code) - LENGTH(REPLACE(code, '.', '')) + 1);"
            ),
            [],
        )?;
        tx.commit()?;
        Ok(count)
    }
}

/// Bake `csv_path` into a fresh database at `db_path`.
///
/// Any existing database file is deleted first; the parent directory is
/// created when missing.
///
/// # Errors
///
/// Returns `CatalogError::Io` for filesystem failures, `CatalogError::Csv`
/// for malformed input and `CatalogError::Store` for SQLite failures.
pub fn bake(db_path: &Path, csv_path: &Path) -> Result<BakeSummary, CatalogError> {
    let csv_file = fs::File::open(csv_path).map_err(io_error(csv_path))?;

    tracing::info!(path = %db_path.display(), "Initializing category database");
    if db_path.exists() {
        tracing::info!(path = %db_path.display(), "Database already exists, deleting it");
        fs::remove_file(db_path).map_err(io_error(db_path))?;
    }
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            tracing::info!(path = %parent.display(), "Creating database directory");
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }

    let mut store = Store::create(db_path)?;
    store.create_schema()?;
    let categories = store.load_csv(csv_file)?;
    tracing::info!(categories, "Baked categories");

    Ok(BakeSummary {
        db_path: db_path.to_owned(),
        categories,
    })
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CatalogError + '_ {
    move |source| CatalogError::Io {
        path: path.to_owned(),
        source,
    }
}
