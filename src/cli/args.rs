/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::catalog::{COICOP, QueryOptions};

/// coicop-query: look up and search COICOP consumption categories.
#[derive(Debug, Parser)]
#[command(
    name = "coicop-query",
    about = "Look up and full-text search COICOP categories",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Category database, as written by `coicop-query bake`.
    #[arg(
        long,
        global = true,
        env = "COICOP_QUERY_DB",
        value_name = "PATH",
        default_value = "coicop.sqlite"
    )]
    pub db: PathBuf,

    /// Render width in columns. Defaults to the terminal width.
    #[arg(long, global = true, env = "COICOP_QUERY_WIDTH", value_name = "COLS")]
    pub width: Option<usize>,

    /// Log progress to stderr (info level). `RUST_LOG` overrides.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a COICOP category by code.
    Get(GetArgs),
    /// Query COICOP categories via database full-text search.
    #[command(after_help = query_help())]
    Query(QueryArgs),
    /// Load the COICOP CSV taxonomy into a fresh category database.
    Bake(BakeArgs),
}

fn query_help() -> String {
    format!(
        "Columns available for --select and --sort: {}.\nOnly {} are printed.",
        COICOP.column_names().join(", "),
        COICOP.printed_column_names().join(", ")
    )
}

/// Arguments for `coicop-query get`.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Category code, e.g. "02.1.1".
    pub code: String,
}

/// Arguments for `coicop-query query`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Full-text query over title, intro, includes and alsoIncludes (FTS5 syntax).
    pub query: String,

    /// Comma-separated list of columns to return from the query.
    #[arg(long, value_name = "COLUMNS")]
    pub select: Option<String>,

    /// Maximum nesting level of categories to return.
    #[arg(long, value_name = "N")]
    pub max_level: Option<u32>,

    /// Minimum nesting level of categories to return.
    #[arg(long, value_name = "N")]
    pub min_level: Option<u32>,

    /// Maximum number of results to return.
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Comma-separated list of columns to sort by. Ascending unless a column
    /// is followed by ':DESC', e.g. 'title:ASC,code:DESC'.
    #[arg(long, value_name = "SPEC")]
    pub sort: Option<String>,

    /// Additional full-text query over the excludes field only.
    #[arg(long, value_name = "TEXT")]
    pub excludes_query: Option<String>,
}

impl QueryArgs {
    /// The builder's view of these arguments.
    #[must_use]
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            query: self.query.clone(),
            excludes_query: self.excludes_query.clone(),
            min_level: self.min_level,
            max_level: self.max_level,
            limit: self.limit,
            select: self.select.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// Arguments for `coicop-query bake`.
#[derive(Debug, Args)]
pub struct BakeArgs {
    /// COICOP taxonomy CSV with a header row.
    #[arg(
        long,
        env = "COICOP_QUERY_CSV",
        value_name = "PATH",
        default_value = "data/coicop-2018-structure.csv"
    )]
    pub csv: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_args() {
        let cli = Cli::parse_from([
            "coicop-query",
            "--db",
            "/tmp/c.sqlite",
            "query",
            "\"video game\" AND \"consoles\"",
            "--max-level",
            "4",
            "--min-level",
            "2",
            "--limit",
            "10",
            "--select",
            "code,title,intro",
            "--sort",
            "level:DESC,code:ASC",
            "--excludes-query",
            "food",
        ]);
        assert_eq!(cli.db, PathBuf::from("/tmp/c.sqlite"));
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        let opts = args.options();
        assert_eq!(opts.query, "\"video game\" AND \"consoles\"");
        assert_eq!(opts.max_level, Some(4));
        assert_eq!(opts.min_level, Some(2));
        assert_eq!(opts.limit, Some(10));
        assert_eq!(opts.select.as_deref(), Some("code,title,intro"));
        assert_eq!(opts.sort.as_deref(), Some("level:DESC,code:ASC"));
        assert_eq!(opts.excludes_query.as_deref(), Some("food"));
    }

    #[test]
    fn test_get_args_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["coicop-query", "get", "02", "--verbose", "--width", "100"]);
        assert!(cli.verbose);
        assert_eq!(cli.width, Some(100));
        assert!(matches!(cli.command, Command::Get(GetArgs { ref code }) if code == "02"));
    }

    #[test]
    fn test_query_requires_text() {
        assert!(Cli::try_parse_from(["coicop-query", "query"]).is_err());
    }

    #[test]
    fn test_negative_level_rejected() {
        assert!(Cli::try_parse_from(["coicop-query", "query", "x", "--max-level", "-1"]).is_err());
    }

    #[test]
    fn test_query_help_lists_schema_columns() {
        assert_eq!(
            query_help(),
            "Columns available for --select and --sort: \
             id, code, title, intro, includes, alsoIncludes, excludes, level.\n\
             Only code, title, intro, includes, alsoIncludes, excludes are printed."
        );
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
