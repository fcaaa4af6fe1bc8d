/// `bake` command: rebuild the category database from the taxonomy CSV.
use std::io::Write;
use std::path::Path;

use crate::catalog::{self, BakeSummary, CatalogError};
use crate::cli::OutputCtx;
use crate::cli::args::BakeArgs;

/// Run `coicop-query bake`.
///
/// # Errors
///
/// Returns `CatalogError` if the CSV cannot be read or parsed, or the
/// database cannot be replaced.
pub fn run(args: &BakeArgs, db: &Path, ctx: &OutputCtx) -> Result<(), CatalogError> {
    let _t_bake = ctx.timer("bake");
    let summary = catalog::bake(db, &args.csv)?;
    drop(_t_bake);

    let stdout = std::io::stdout();
    write_summary(&summary, &mut stdout.lock())
}

fn write_summary<W: Write>(summary: &BakeSummary, out: &mut W) -> Result<(), CatalogError> {
    writeln!(
        out,
        "Baked {} categories into {}",
        summary.categories,
        summary.db_path.display()
    )?;
    Ok(())
}
