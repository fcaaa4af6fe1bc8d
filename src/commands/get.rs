/// `get` command: look up a category by its exact code.
use std::io::Write;
use std::path::Path;

use crate::catalog::{CatalogError, Store};
use crate::cli::OutputCtx;
use crate::cli::args::GetArgs;

/// Run `coicop-query get`.
///
/// # Errors
///
/// Returns `CatalogError` if the database is unavailable, no category carries
/// the code, or output cannot be written.
pub fn run(args: &GetArgs, db: &Path, ctx: &OutputCtx) -> Result<(), CatalogError> {
    let _t_open = ctx.timer("open_store");
    let store = Store::open_read_only(db)?;
    drop(_t_open);

    let stdout = std::io::stdout();
    write_category(&store, &args.code, ctx, &mut stdout.lock())
}

/// Look up `code` and render every match.
///
/// # Errors
///
/// Returns `CatalogError::NotFound` (before writing anything) when no
/// category carries `code`.
pub fn write_category<W: Write>(
    store: &Store,
    code: &str,
    ctx: &OutputCtx,
    out: &mut W,
) -> Result<(), CatalogError> {
    let _t_lookup = ctx.timer("find_by_code");
    let rows = store.find_by_code(code)?;
    drop(_t_lookup);

    if rows.is_empty() {
        return Err(CatalogError::NotFound {
            code: code.to_owned(),
        });
    }

    let renderer = ctx.renderer();
    for row in &rows {
        renderer.write_category(out, row)?;
    }
    Ok(())
}
