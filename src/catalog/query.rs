/// Full-text query building over the category store.
///
/// A query always matches the main full-text index (`title`, `intro`,
/// `includes`, `alsoIncludes`). An optional second match runs against the
/// excludes-only index so a term in the exclusions is not diluted by the
/// main fields. Level bounds, sorting and a row limit are ANDed/appended.
///
/// The store executes [`CategoryQuery::sql`] with the free text bound as
/// parameters. [`CategoryQuery::inline_sql`] embeds the free text as quoted
/// SQL literals instead; it is used for logging and for running the query
/// by hand. The store is local and single-user, so a malformed literal can
/// only break the caller's own query.
use std::fmt::Write as _;
use std::str::FromStr;

use super::errors::CatalogError;
use super::schema::{Column, Schema};

/// The structured table holding one row per category.
pub const CATEGORY_TABLE: &str = "category";
/// Full-text index over `title`, `intro`, `includes` and `alsoIncludes`.
pub const MAIN_FTS_TABLE: &str = "category_fts";
/// Full-text index over `excludes` only.
pub const EXCLUDES_FTS_TABLE: &str = "category_excludes_fts";

/// Query options, as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Full-text query against the main index. Always applied.
    pub query: String,
    /// Full-text query against the excludes index.
    pub excludes_query: Option<String>,
    /// Minimum category level (inclusive).
    pub min_level: Option<u32>,
    /// Maximum category level (inclusive).
    pub max_level: Option<u32>,
    /// Maximum number of rows. `0` means unbounded.
    pub limit: Option<u32>,
    /// Comma-separated column names to select.
    pub select: Option<String>,
    /// Comma-separated `column[:ASC|DESC]` sort spec.
    pub sort: Option<String>,
}

/// Sort direction of one `ORDER BY` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(CatalogError::InvalidSortDirection {
                direction: s.to_owned(),
            })
        }
    }
}

/// One `ORDER BY` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub direction: SortDirection,
}

/// A full-text `MATCH` against one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtsMatch {
    /// The FTS5 table to match against.
    pub table: &'static str,
    /// The user's query text, verbatim.
    pub text: String,
}

/// A validated, ready-to-run category query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    /// Selected columns. Always includes the schema's mandatory columns.
    pub columns: Vec<Column>,
    /// Full-text matches, ANDed. The first is always the main index.
    pub matches: Vec<FtsMatch>,
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
    /// Sort keys in first-occurrence order. Empty means natural order.
    pub order: Vec<SortKey>,
    pub limit: Option<u32>,
}

impl CategoryQuery {
    /// SQL with `?N` placeholders; bind [`params`](Self::params) in order.
    #[must_use]
    pub fn sql(&self) -> String {
        self.render(|i, _| format!("?{}", i + 1))
    }

    /// Values for the placeholders of [`sql`](Self::sql).
    #[must_use]
    pub fn params(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.text.as_str()).collect()
    }

    /// SQL with the full-text queries embedded as quoted literals.
    #[must_use]
    pub fn inline_sql(&self) -> String {
        self.render(|_, text| quote_literal(text))
    }

    fn render(&self, literal: impl Fn(usize, &str) -> String) -> String {
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        let mut sql = format!(
            "SELECT {} FROM {CATEGORY_TABLE} WHERE ",
            columns.join(", ")
        );

        let mut conditions: Vec<String> = self
            .matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                format!(
                    "id IN (SELECT rowid FROM {table} WHERE {table} MATCH {})",
                    literal(i, &m.text),
                    table = m.table
                )
            })
            .collect();
        if let Some(max) = self.max_level {
            conditions.push(format!("level <= {max}"));
        }
        if let Some(min) = self.min_level {
            conditions.push(format!("level >= {min}"));
        }
        sql.push_str(&conditions.join(" AND "));

        if !self.order.is_empty() {
            let keys: Vec<String> = self
                .order
                .iter()
                .map(|k| format!("{} {}", k.column, k.direction.as_sql()))
                .collect();
            let _ = write!(sql, " ORDER BY {}", keys.join(", "));
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        sql.push(';');
        sql
    }
}

/// Validate `opts` against `schema` and build the query.
///
/// # Errors
///
/// - `CatalogError::UnknownSortColumn` / `InvalidSortDirection` for a bad `--sort`
/// - `CatalogError::InvalidSelect` naming every unknown `--select` column
pub fn build_query(opts: &QueryOptions, schema: &Schema) -> Result<CategoryQuery, CatalogError> {
    let order = match non_blank(opts.sort.as_deref()) {
        Some(spec) => parse_sort(spec, schema)?,
        None => Vec::new(),
    };

    let columns = match non_blank(opts.select.as_deref()) {
        Some(spec) => parse_select(spec, schema)?,
        None => schema.columns().to_vec(),
    };

    let mut matches = vec![FtsMatch {
        table: MAIN_FTS_TABLE,
        text: opts.query.clone(),
    }];
    if let Some(text) = non_blank(opts.excludes_query.as_deref()) {
        matches.push(FtsMatch {
            table: EXCLUDES_FTS_TABLE,
            text: text.to_owned(),
        });
    }

    Ok(CategoryQuery {
        columns,
        matches,
        min_level: opts.min_level,
        max_level: opts.max_level,
        order,
        limit: opts.limit.filter(|&n| n > 0),
    })
}

/// Parse a comma-separated select list.
///
/// Duplicate names collapse to their first occurrence. Mandatory columns
/// missing from the list are appended.
///
/// # Errors
///
/// Returns `CatalogError::InvalidSelect` listing every unknown name.
pub fn parse_select(spec: &str, schema: &Schema) -> Result<Vec<Column>, CatalogError> {
    let mut columns: Vec<Column> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();

    for name in spec.split(',').map(str::trim) {
        match schema.column(name) {
            Ok(column) if !columns.contains(&column) => columns.push(column),
            Ok(_) => {}
            Err(_) if unknown.iter().any(|u| u == name) => {}
            Err(_) => unknown.push(name.to_owned()),
        }
    }

    if !unknown.is_empty() {
        return Err(CatalogError::InvalidSelect { columns: unknown });
    }

    for &column in schema.mandatory() {
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    Ok(columns)
}

/// Parse a comma-separated `column[:ASC|DESC]` sort spec.
///
/// A repeated column keeps its first position and takes the last direction.
///
/// # Errors
///
/// Returns `CatalogError::UnknownSortColumn` or
/// `CatalogError::InvalidSortDirection` for the first bad token.
pub fn parse_sort(spec: &str, schema: &Schema) -> Result<Vec<SortKey>, CatalogError> {
    let mut keys: Vec<SortKey> = Vec::new();

    for token in spec.split(',').map(str::trim) {
        let (name, direction) = match token.split_once(':') {
            Some((name, direction)) => (name.trim(), Some(direction.trim())),
            None => (token, None),
        };

        let column = schema
            .column(name)
            .map_err(|_| CatalogError::UnknownSortColumn {
                name: name.to_owned(),
            })?;
        let direction = direction.map_or(Ok(SortDirection::Asc), str::parse::<SortDirection>)?;

        match keys.iter_mut().find(|k| k.column == column) {
            Some(existing) => existing.direction = direction,
            None => keys.push(SortKey { column, direction }),
        }
    }
    Ok(keys)
}

/// Quote `text` as an SQL string literal, doubling embedded single quotes.
#[must_use]
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
