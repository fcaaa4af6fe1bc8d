/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod bake;
pub mod get;
pub mod query;

use std::path::Path;

use crate::catalog::CatalogError;
use crate::cli::OutputCtx;
use crate::cli::args::Command;

/// Dispatch a parsed `Command` to its handler.
///
/// # Errors
///
/// Returns `CatalogError` on any command failure.
pub fn dispatch(command: &Command, db: &Path, ctx: &OutputCtx) -> Result<(), CatalogError> {
    match command {
        Command::Get(args) => get::run(args, db, ctx),
        Command::Query(args) => query::run(args, db, ctx),
        Command::Bake(args) => bake::run(args, db, ctx),
    }
}
