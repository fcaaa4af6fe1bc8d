/// Errors from the category catalog layer.
use std::path::PathBuf;

use thiserror::Error;

use super::schema::Column;

/// Errors that can occur while querying or baking the category store.
///
/// Wrapped errors are kept as the `source`, not repeated in the message;
/// the CLI prints the whole chain.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// `--select` named one or more columns that do not exist.
    #[error("'--select' argument referenced unknown column name(s) {}", quote_names(columns))]
    InvalidSelect {
        /// The unknown names, in the order given.
        columns: Vec<String>,
    },

    /// `--sort` named a column that does not exist.
    #[error("Unknown column name [{name}] in sort argument")]
    UnknownSortColumn {
        /// The unknown name.
        name: String,
    },

    /// `--sort` used a direction other than ASC or DESC.
    #[error("Unknown column order [{direction}] in sort argument")]
    InvalidSortDirection {
        /// The direction as given.
        direction: String,
    },

    /// No category carries the requested code.
    #[error("No category found for code [{code}]")]
    NotFound {
        /// The searched code.
        code: String,
    },

    /// A result batch does not carry the columns every printed row needs.
    /// Only reachable if a query bypassed the builder's column injection.
    #[error("Result rows are missing mandatory column(s) {}", join_columns(missing))]
    MissingMandatoryColumns {
        /// Mandatory columns absent from every row.
        missing: Vec<Column>,
    },

    /// The database file is missing or cannot be opened.
    #[error(
        "Category database unavailable at [{}]. Run `coicop-query bake` to build it first",
        path.display()
    )]
    StoreUnavailable {
        /// Where the database was expected.
        path: PathBuf,
    },

    /// An underlying SQLite error.
    #[error("Category store error")]
    Store(#[from] rusqlite::Error),

    /// A malformed taxonomy CSV record.
    #[error("Invalid taxonomy CSV")]
    Csv(#[from] csv::Error),

    /// Writing rendered output failed (e.g. a closed pipe).
    #[error("Failed to write output")]
    Output(#[from] std::io::Error),

    /// A filesystem error while baking.
    #[error("I/O error at [{}]", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

fn quote_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Exit code mapping for `CatalogError` variants.
impl CatalogError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidSelect { .. }
            | Self::UnknownSortColumn { .. }
            | Self::InvalidSortDirection { .. } => 2,
            Self::StoreUnavailable { .. } => 3,
            Self::NotFound { .. } => 4,
            Self::MissingMandatoryColumns { .. }
            | Self::Store(_)
            | Self::Csv(_)
            | Self::Output(_)
            | Self::Io { .. } => 1,
        }
    }
}
