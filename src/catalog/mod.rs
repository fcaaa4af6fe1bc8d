/// Category domain layer: schema, query building, store access, ingestion.
pub mod bake;
pub mod errors;
pub mod query;
pub mod row;
pub mod schema;
pub mod store;

pub use bake::{BakeSummary, bake};
pub use errors::CatalogError;
pub use query::{CategoryQuery, QueryOptions, build_query};
pub use row::CategoryRow;
pub use schema::{COICOP, Column, Schema};
pub use store::Store;
