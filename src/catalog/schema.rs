/// Column registry for the `category` table.
///
/// Knows every column a query may select or sort on, which columns a
/// rendered row can never do without (`code`, `title`), and which columns are
/// carried by results but never printed (`id`, `level`).
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A column of the `category` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// Surrogate key assigned at bake time.
    Id,
    /// Dotted hierarchical code, e.g. `02.1.1`.
    Code,
    /// Short human label.
    Title,
    /// Introductory paragraph.
    Intro,
    /// Newline-separated list of included items.
    Includes,
    /// Newline-separated list of items also included.
    AlsoIncludes,
    /// Newline-separated list of excluded items.
    Excludes,
    /// Hierarchy depth: dot count of `code` plus one.
    Level,
}

impl Column {
    /// Every column, in table order.
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::Code,
        Self::Title,
        Self::Intro,
        Self::Includes,
        Self::AlsoIncludes,
        Self::Excludes,
        Self::Level,
    ];

    /// The SQL column name, which is also the name accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::Title => "title",
            Self::Intro => "intro",
            Self::Includes => "includes",
            Self::AlsoIncludes => "alsoIncludes",
            Self::Excludes => "excludes",
            Self::Level => "level",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column name that is not part of the `category` table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column '{0}'")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownColumn(s.to_owned()))
    }
}

/// A schema whose column subsets are inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A mandatory or suppressed column is missing from the full column set.
    #[error("{subset} column '{column}' is not part of the schema")]
    NotSubset {
        /// Which subset is broken ("mandatory" or "suppressed").
        subset: &'static str,
        /// The stray column.
        column: Column,
    },
}

/// Column sets of a category table.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    columns: &'static [Column],
    mandatory: &'static [Column],
    suppressed: &'static [Column],
}

impl Schema {
    /// Build a schema, checking that the mandatory and suppressed sets are
    /// subsets of `columns`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotSubset` naming the first stray column.
    pub const fn new(
        columns: &'static [Column],
        mandatory: &'static [Column],
        suppressed: &'static [Column],
    ) -> Result<Self, SchemaError> {
        if let Some(column) = first_outside(mandatory, columns) {
            return Err(SchemaError::NotSubset {
                subset: "mandatory",
                column,
            });
        }
        if let Some(column) = first_outside(suppressed, columns) {
            return Err(SchemaError::NotSubset {
                subset: "suppressed",
                column,
            });
        }
        Ok(Self {
            columns,
            mandatory,
            suppressed,
        })
    }

    /// All known columns.
    #[must_use]
    pub const fn columns(&self) -> &'static [Column] {
        self.columns
    }

    /// Columns every printed row must carry.
    #[must_use]
    pub const fn mandatory(&self) -> &'static [Column] {
        self.mandatory
    }

    #[must_use]
    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    #[must_use]
    pub fn is_mandatory(&self, column: Column) -> bool {
        self.mandatory.contains(&column)
    }

    #[must_use]
    pub fn is_suppressed(&self, column: Column) -> bool {
        self.suppressed.contains(&column)
    }

    /// Look up a column by its name, rejecting names outside this schema.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` when the name is not a column of this schema.
    pub fn column(&self, name: &str) -> Result<Column, UnknownColumn> {
        match name.parse::<Column>() {
            Ok(column) if self.contains(column) => Ok(column),
            _ => Err(UnknownColumn(name.to_owned())),
        }
    }

    /// Column names in table order, for help text.
    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Names of the columns the renderer prints, for help text.
    #[must_use]
    pub fn printed_column_names(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !self.is_suppressed(**c))
            .map(|c| c.name())
            .collect()
    }
}

const fn first_outside(subset: &[Column], columns: &[Column]) -> Option<Column> {
    let mut i = 0;
    while i < subset.len() {
        let mut found = false;
        let mut j = 0;
        while j < columns.len() {
            if subset[i] as u8 == columns[j] as u8 {
                found = true;
            }
            j += 1;
        }
        if !found {
            return Some(subset[i]);
        }
        i += 1;
    }
    None
}

/// The COICOP category schema. Subset consistency is checked at compile time.
pub const COICOP: Schema = match Schema::new(
    &Column::ALL,
    &[Column::Code, Column::Title],
    &[Column::Id, Column::Level],
) {
    Ok(schema) => schema,
    Err(_) => panic!("COICOP schema subsets must be drawn from its columns"),
};
