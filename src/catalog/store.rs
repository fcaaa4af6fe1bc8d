/// SQLite-backed category store.
///
/// The store is a scoped handle: dropping it closes the connection, so every
/// exit path of a command (including validation and not-found errors)
/// releases it.
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Statement, params_from_iter};

use super::errors::CatalogError;
use super::query::{CATEGORY_TABLE, CategoryQuery};
use super::row::{CategoryRow, Value};
use super::schema::{COICOP, Column};

/// A handle on the category database.
pub struct Store {
    pub(super) conn: Connection,
}

impl Store {
    /// Open an existing database read-only.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::StoreUnavailable` if the file does not exist,
    /// cannot be opened, or is not a baked category database (not SQLite at
    /// all, empty, or without the `category` table).
    pub fn open_read_only(path: &Path) -> Result<Self, CatalogError> {
        tracing::info!(path = %path.display(), readonly = true, "Using category database");
        let unavailable = || CatalogError::StoreUnavailable {
            path: path.to_owned(),
        };
        if !path.is_file() {
            return Err(unavailable());
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|err| {
            tracing::warn!(error = %err, "Failed to open category database");
            unavailable()
        })?;

        // SQLite opens lazily; the first read is what rejects a foreign file.
        let baked = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [CATEGORY_TABLE],
                |_| Ok(()),
            )
            .optional()
            .map_err(|err| {
                tracing::warn!(error = %err, "Category database is unreadable");
                unavailable()
            })?;
        if baked.is_none() {
            tracing::warn!("Category database has no {CATEGORY_TABLE} table");
            return Err(unavailable());
        }
        Ok(Self::with_connection(conn))
    }

    /// Open (creating if needed) a database read-write, for baking.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if SQLite cannot open the file.
    pub fn create(path: &Path) -> Result<Self, CatalogError> {
        tracing::info!(path = %path.display(), readonly = false, "Using category database");
        let conn = Connection::open(path)?;
        Ok(Self::with_connection(conn))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if SQLite cannot allocate the database.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, CatalogError> {
        Ok(Self::with_connection(Connection::open_in_memory()?))
    }

    fn with_connection(mut conn: Connection) -> Self {
        conn.trace(Some(trace_statement));
        Self { conn }
    }

    /// Exact lookup of the categories carrying `code`, all columns selected.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` on any SQLite failure.
    pub fn find_by_code(&self, code: &str) -> Result<Vec<CategoryRow>, CatalogError> {
        let columns: Vec<&str> = COICOP.columns().iter().map(|c| c.name()).collect();
        let sql = format!(
            "SELECT {} FROM {CATEGORY_TABLE} WHERE code = ?1;",
            columns.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        read_rows(&mut stmt, [code])
    }

    /// Run a built full-text query, binding its free-text parameters.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` on any SQLite failure, including a
    /// malformed full-text query.
    pub fn run(&self, query: &CategoryQuery) -> Result<Vec<CategoryRow>, CatalogError> {
        let mut stmt = self.conn.prepare(&query.sql())?;
        read_rows(&mut stmt, query.params())
    }

    /// Run arbitrary SQL without parameters, reading rows the same way.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` on any SQLite failure.
    #[cfg(test)]
    pub fn run_sql(&self, sql: &str) -> Result<Vec<CategoryRow>, CatalogError> {
        let mut stmt = self.conn.prepare(sql)?;
        read_rows(&mut stmt, [] as [&str; 0])
    }
}

fn read_rows<P>(stmt: &mut Statement<'_>, params: P) -> Result<Vec<CategoryRow>, CatalogError>
where
    P: IntoIterator,
    P::Item: rusqlite::ToSql,
{
    let columns = stmt
        .column_names()
        .into_iter()
        .map(|name| {
            name.parse::<Column>()
                .map_err(|_| rusqlite::Error::InvalidColumnName(name.to_owned()))
        })
        .collect::<Result<Vec<Column>, _>>()?;

    let mut rows = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut category = CategoryRow::new();
        for (i, &column) in columns.iter().enumerate() {
            let value = match row.get_ref(i)? {
                ValueRef::Null => continue,
                ValueRef::Integer(n) => Value::Integer(n),
                ValueRef::Real(f) => Value::Text(f.to_string()),
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    Value::Text(String::from_utf8_lossy(bytes).into_owned())
                }
            };
            category.set(column, value);
        }
        tracing::debug!(row = ?category, "Raw row");
        out.push(category);
    }
    Ok(out)
}

fn trace_statement(sql: &str) {
    tracing::debug!(target: "coicop_query::sql", "{sql}");
}
