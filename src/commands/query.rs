/// `query` command: full-text search over categories.
use std::io::Write;
use std::path::Path;

use crate::catalog::{COICOP, CatalogError, CategoryQuery, Store, build_query};
use crate::cli::OutputCtx;
use crate::cli::args::QueryArgs;

/// Run `coicop-query query`.
///
/// The query is validated before the database is opened, so bad `--select`
/// or `--sort` arguments fail without touching the store.
///
/// # Errors
///
/// Returns `CatalogError` on invalid arguments, an unavailable database, a
/// malformed full-text query, or an output failure.
pub fn run(args: &QueryArgs, db: &Path, ctx: &OutputCtx) -> Result<(), CatalogError> {
    let query = build_query(&args.options(), &COICOP)?;
    tracing::info!("Complete query [{}]", query.inline_sql());

    let _t_open = ctx.timer("open_store");
    let store = Store::open_read_only(db)?;
    drop(_t_open);

    let stdout = std::io::stdout();
    write_results(&store, &query, ctx, &mut stdout.lock())
}

/// Run a built query, rendering every returned row. No rows, no output.
///
/// # Errors
///
/// Returns `CatalogError` for store or output failures.
pub fn write_results<W: Write>(
    store: &Store,
    query: &CategoryQuery,
    ctx: &OutputCtx,
    out: &mut W,
) -> Result<(), CatalogError> {
    let _t_run = ctx.timer("run_query");
    let rows = store.run(query)?;
    drop(_t_run);
    tracing::info!(rows = rows.len(), "Query returned");

    let _t_render = ctx.timer("render");
    ctx.renderer().write_categories(out, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QueryOptions;
    use crate::catalog::store::testing::sample_store;

    fn render(opts: &QueryOptions, width: usize) -> Result<String, CatalogError> {
        let store = sample_store();
        let query = build_query(opts, &COICOP)?;
        let mut out = Vec::new();
        write_results(&store, &query, &OutputCtx::new(Some(width)), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn opts(query: &str) -> QueryOptions {
        QueryOptions {
            query: query.to_owned(),
            ..QueryOptions::default()
        }
    }

    #[test]
    fn test_code_title_results_have_no_separator() {
        let out = render(
            &QueryOptions {
                select: Some("code,level".to_owned()),
                sort: Some("code:ASC".to_owned()),
                ..opts("alcoholic")
            },
            60,
        )
        .unwrap();
        assert_eq!(
            out,
            "            01 - Food and non-alcoholic beverages\n\
             \x20           02 - Alcoholic beverages, tobacco and narcotics\n\
             \x20         02.1 - Alcoholic beverages\n"
        );
    }

    #[test]
    fn test_rich_results_are_separated() {
        let out = render(
            &QueryOptions {
                select: Some("code,title,intro".to_owned()),
                sort: Some("code".to_owned()),
                ..opts("alcoholic")
            },
            60,
        )
        .unwrap();
        let rule = "=".repeat(60);
        let separators = out.matches(&format!("\n\n{rule}\n")).count();
        assert_eq!(separators, 2);
        assert!(out.starts_with("            01 - Food and non-alcoholic beverages\n"));
    }

    #[test]
    fn test_example_query() {
        let out = render(
            &QueryOptions {
                max_level: Some(4),
                min_level: Some(2),
                limit: Some(10),
                select: Some("code,title,intro".to_owned()),
                sort: Some("level:DESC,code:ASC".to_owned()),
                ..opts(r#""video game" AND "consoles""#)
            },
            80,
        )
        .unwrap();
        assert_eq!(out, "        09.3.1 - Games, toys and hobbies (SD)\n");
    }

    #[test]
    fn test_excludes_query_narrows_results() {
        let out = render(
            &QueryOptions {
                excludes_query: Some("restaurants".to_owned()),
                select: Some("code,title".to_owned()),
                ..opts("alcoholic")
            },
            80,
        )
        .unwrap();
        assert_eq!(out, "          02.1 - Alcoholic beverages\n");
    }

    #[test]
    fn test_no_results_print_nothing() {
        assert_eq!(render(&opts("submarines"), 80).unwrap(), "");
    }

    #[test]
    fn test_invalid_select_reported() {
        let err = render(
            &QueryOptions {
                select: Some("code,name".to_owned()),
                ..opts("alcoholic")
            },
            80,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'--select' argument referenced unknown column name(s) 'name'"
        );
    }

    #[test]
    fn test_validation_precedes_store_access() {
        let dir = tempfile::tempdir().unwrap();
        let args = QueryArgs {
            query: "wine".to_owned(),
            select: None,
            max_level: None,
            min_level: None,
            limit: None,
            sort: Some("code:sideways".to_owned()),
            excludes_query: None,
        };
        let err = run(&args, &dir.path().join("none.sqlite"), &OutputCtx::new(Some(80))).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSortDirection { .. }));
    }

    #[test]
    fn test_foreign_database_file_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("coicop.sqlite");
        std::fs::write(&db, "not a database").unwrap();
        let args = QueryArgs {
            query: "wine".to_owned(),
            select: None,
            max_level: None,
            min_level: None,
            limit: None,
            sort: None,
            excludes_query: None,
        };
        let err = run(&args, &db, &OutputCtx::new(Some(80))).unwrap_err();
        assert!(matches!(err, CatalogError::StoreUnavailable { .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("coicop-query bake"));
    }
}
