/// Result rows with a dynamic set of columns.
use std::collections::BTreeMap;
use std::fmt;

use super::schema::Column;

/// A single cell value read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
}

impl Value {
    /// Empty text counts as absent; integers are always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Integer(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// One category row. Only the columns named by the executed select list are
/// carried; SQL `NULL` is stored as a missing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRow {
    values: BTreeMap<Column, Value>,
}

impl CategoryRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column's value, replacing any previous one.
    pub fn set(&mut self, column: Column, value: Value) {
        self.values.insert(column, value);
    }

    /// Builder-style [`set`](Self::set) for text columns.
    #[cfg(test)]
    #[must_use]
    pub fn with_text(mut self, column: Column, text: impl Into<String>) -> Self {
        self.set(column, Value::Text(text.into()));
        self
    }

    /// Builder-style [`set`](Self::set) for integer columns.
    #[cfg(test)]
    #[must_use]
    pub fn with_integer(mut self, column: Column, n: i64) -> Self {
        self.set(column, Value::Integer(n));
        self
    }

    #[must_use]
    pub fn get(&self, column: Column) -> Option<&Value> {
        self.values.get(&column)
    }

    /// Text of a present column, or `None` when the column is missing or empty.
    #[must_use]
    pub fn text(&self, column: Column) -> Option<&str> {
        match self.get(column) {
            Some(Value::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Whether the column is carried by this row with a non-empty value.
    #[must_use]
    pub fn is_present(&self, column: Column) -> bool {
        self.values.get(&column).is_some_and(|v| !v.is_empty())
    }

    /// Columns carried with a non-empty value, in table order.
    pub fn present_columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.values.keys().copied().filter(|c| self.is_present(*c))
    }
}
