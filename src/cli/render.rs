/// Human-readable rendering of category rows.
///
/// A category renders as a header line (`code` right-aligned in a 14-column
/// gutter, then ` - title`) followed by one rule-delimited section per
/// non-empty text field. Section bodies wrap to the terminal width with a
/// hanging indent of 17 columns.
use std::collections::BTreeSet;
use std::io::Write;

use crate::catalog::{CatalogError, CategoryRow, Column, Schema};

use super::wrap::wrap;

/// Width of the right-aligned code column in the header line.
pub const LEFT_COLUMN: usize = 14;
/// Hanging indent of every wrapped section line: the gutter plus `" - "`.
pub const HANGING_INDENT: usize = LEFT_COLUMN + 3;
/// Indent of list lines after the first, leaving room for a `"* "` bullet.
const LIST_INDENT: usize = HANGING_INDENT - 2;

const BULLET: &str = "* ";

#[derive(Debug, Clone, Copy)]
enum SectionKind {
    Paragraph,
    List,
}

/// Printed sections, in order.
const SECTIONS: [(Column, &str, SectionKind); 4] = [
    (Column::Intro, "Intro", SectionKind::Paragraph),
    (Column::Includes, "Includes", SectionKind::List),
    (Column::AlsoIncludes, "Also Includes", SectionKind::List),
    (Column::Excludes, "Excludes", SectionKind::List),
];

/// Renders category rows at a fixed width.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    width: usize,
    schema: Schema,
}

impl Renderer {
    #[must_use]
    pub fn new(width: usize, schema: Schema) -> Self {
        Self { width, schema }
    }

    /// Render one category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Output` if writing fails.
    pub fn write_category<W: Write>(&self, out: &mut W, row: &CategoryRow) -> Result<(), CatalogError> {
        let code = row.text(Column::Code).unwrap_or_default();
        let title = row.text(Column::Title).unwrap_or_default();
        writeln!(out, "{code:>LEFT_COLUMN$} - {title}")?;

        for (column, label, kind) in SECTIONS {
            let Some(text) = row.text(column) else {
                continue;
            };
            writeln!(out, "{}", "-".repeat(self.width))?;
            match kind {
                SectionKind::Paragraph => self.write_paragraph(out, label, text)?,
                SectionKind::List => self.write_list(out, label, text)?,
            }
        }
        Ok(())
    }

    /// Render a batch of categories, separating them with a `=` rule unless
    /// every row is a bare `code - title` line.
    ///
    /// Zero rows render nothing.
    ///
    /// # Errors
    ///
    /// - `CatalogError::MissingMandatoryColumns` if no row carries one of the
    ///   schema's mandatory columns; nothing is written in that case
    /// - `CatalogError::Output` if writing fails
    pub fn write_categories<W: Write>(
        &self,
        out: &mut W,
        rows: &[CategoryRow],
    ) -> Result<(), CatalogError> {
        if rows.is_empty() {
            return Ok(());
        }

        let present: BTreeSet<Column> = rows.iter().flat_map(CategoryRow::present_columns).collect();
        let missing: Vec<Column> = self
            .schema
            .mandatory()
            .iter()
            .copied()
            .filter(|c| !present.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::MissingMandatoryColumns { missing });
        }

        let separated = self.needs_separator(&present);
        for (i, row) in rows.iter().enumerate() {
            if separated && i > 0 {
                writeln!(out)?;
                writeln!(out, "{}", "=".repeat(self.width))?;
            }
            self.write_category(out, row)?;
        }
        Ok(())
    }

    /// Rows need a separator once any printable, non-mandatory column is
    /// present. Callers have already checked that every mandatory one is.
    fn needs_separator(&self, present: &BTreeSet<Column>) -> bool {
        present
            .iter()
            .any(|&c| !self.schema.is_suppressed(c) && !self.schema.is_mandatory(c))
    }

    fn write_paragraph<W: Write>(&self, out: &mut W, label: &str, text: &str) -> Result<(), CatalogError> {
        let header = format!("{label} - ");
        let initial = format!("{header:>HANGING_INDENT$}");
        let subsequent = " ".repeat(HANGING_INDENT);
        write_lines(out, &wrap(text, self.width, &initial, &subsequent))
    }

    /// The first line is labelled; a dash is added only when the line does not
    /// already carry a bullet. Later lines keep their own bullets, if any.
    fn write_list<W: Write>(&self, out: &mut W, label: &str, text: &str) -> Result<(), CatalogError> {
        let header = format!("{label} ");
        let subsequent = " ".repeat(HANGING_INDENT);

        for (i, line) in text.lines().enumerate() {
            let initial = if i > 0 {
                " ".repeat(LIST_INDENT)
            } else if line.starts_with(BULLET) {
                format!("{header:>LIST_INDENT$}")
            } else {
                format!("{:>HANGING_INDENT$}", format!("{header}- "))
            };
            write_lines(out, &wrap(line, self.width, &initial, &subsequent))?;
        }
        Ok(())
    }
}

/// Blank input still prints one empty line, keeping the section visible.
fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> Result<(), CatalogError> {
    if lines.is_empty() {
        writeln!(out)?;
    }
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::COICOP;

    fn render_one(row: &CategoryRow, width: usize) -> String {
        let mut out = Vec::new();
        Renderer::new(width, COICOP).write_category(&mut out, row).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn render_many(rows: &[CategoryRow], width: usize) -> Result<String, CatalogError> {
        let mut out = Vec::new();
        Renderer::new(width, COICOP).write_categories(&mut out, rows)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn bare(code: &str, title: &str) -> CategoryRow {
        CategoryRow::new()
            .with_text(Column::Code, code)
            .with_text(Column::Title, title)
    }

    #[test]
    fn test_header_line() {
        let row = bare("02", "Alcoholic beverages, tobacco and narcotics")
            .with_text(Column::Intro, "")
            .with_integer(Column::Level, 1);
        assert_eq!(
            render_one(&row, 80),
            "            02 - Alcoholic beverages, tobacco and narcotics\n"
        );
    }

    #[test]
    fn test_intro_section() {
        let row = bare("02.1", "Alcoholic beverages").with_text(
            Column::Intro,
            "The alcoholic beverages classified here are those purchased for consumption at home.",
        );
        let expected = "          02.1 - Alcoholic beverages\n\
                        ----------------------------------------\n\
                        \x20        Intro - The alcoholic beverages\n\
                        \x20                classified here are\n\
                        \x20                those purchased for\n\
                        \x20                consumption at home.\n";
        assert_eq!(render_one(&row, 40), expected);
    }

    #[test]
    fn test_list_without_bullets_gets_label_dash() {
        let row = bare("02.1", "Alcoholic beverages").with_text(
            Column::Excludes,
            "food and drinks served away from home\nbeverages sold in restaurants",
        );
        let expected = "          02.1 - Alcoholic beverages\n\
                        ------------------------------------------------------------\n\
                        \x20     Excludes - food and drinks served away from home\n\
                        \x20              beverages sold in restaurants\n";
        assert_eq!(render_one(&row, 60), expected);
    }

    #[test]
    fn test_list_with_bullets_not_double_bulleted() {
        let row = bare("01.1.1", "Cereals").with_text(
            Column::Includes,
            "* rice in all forms\n* flours and meals of cereals",
        );
        let expected = "        01.1.1 - Cereals\n\
                        ------------------------------------------------------------\n\
                        \x20     Includes * rice in all forms\n\
                        \x20              * flours and meals of cereals\n";
        assert_eq!(render_one(&row, 60), expected);
    }

    #[test]
    fn test_list_wraps_with_hanging_indent() {
        let row = bare("09.3.1", "Games").with_text(
            Column::AlsoIncludes,
            "* collectors' items such as stamps and coins",
        );
        let expected = "        09.3.1 - Games\n\
                        ------------------------------\n\
                        \x20Also Includes * collectors'\n\
                        \x20                items such as\n\
                        \x20                stamps and\n\
                        \x20                coins\n";
        assert_eq!(render_one(&row, 30), expected);
    }

    #[test]
    fn test_sections_in_order_with_rules() {
        let row = bare("01", "Food")
            .with_text(Column::Excludes, "x")
            .with_text(Column::Intro, "i")
            .with_text(Column::AlsoIncludes, "a")
            .with_text(Column::Includes, "n");
        let out = render_one(&row, 20);
        let labels: Vec<&str> = out
            .lines()
            .filter_map(|l| l.trim_start().split(" - ").next())
            .filter(|l| !l.starts_with('-') && !l.is_empty())
            .collect();
        assert_eq!(labels, vec!["01", "Intro", "Includes", "Also Includes", "Excludes"]);
        assert_eq!(out.lines().filter(|l| *l == "-".repeat(20)).count(), 4);
    }

    #[test]
    fn test_zero_rows_render_nothing() {
        assert_eq!(render_many(&[], 80).unwrap(), "");
    }

    #[test]
    fn test_no_separator_for_code_title_rows() {
        let rows = vec![
            bare("02", "Alcoholic beverages, tobacco and narcotics").with_integer(Column::Level, 1),
            bare("02.1", "Alcoholic beverages")
                .with_integer(Column::Level, 2)
                .with_integer(Column::Id, 5)
                .with_text(Column::Intro, ""),
        ];
        assert_eq!(
            render_many(&rows, 40).unwrap(),
            "            02 - Alcoholic beverages, tobacco and narcotics\n\
             \x20         02.1 - Alcoholic beverages\n"
        );
    }

    #[test]
    fn test_separator_between_rich_rows() {
        let rows = vec![
            bare("01", "Food"),
            bare("02", "Drinks").with_text(Column::Intro, "Beverages."),
            bare("03", "Clothing"),
        ];
        let out = render_many(&rows, 30).unwrap();
        let rule = "=".repeat(30);
        assert_eq!(
            out,
            format!(
                "            01 - Food\n\
                 \n{rule}\n\
                 \x20           02 - Drinks\n\
                 {dash}\n\
                 \x20        Intro - Beverages.\n\
                 \n{rule}\n\
                 \x20           03 - Clothing\n",
                dash = "-".repeat(30)
            )
        );
        assert!(!out.starts_with('\n'));
    }

    #[test]
    fn test_heterogeneous_rows_share_separator_decision() {
        let rows = vec![
            bare("01", "Food").with_text(Column::Excludes, "* restaurant meals"),
            bare("02", "Drinks"),
        ];
        let out = render_many(&rows, 30).unwrap();
        assert_eq!(out.lines().filter(|l| *l == "=".repeat(30)).count(), 1);
    }

    #[test]
    fn test_missing_mandatory_rejected_before_output() {
        let rows = vec![
            CategoryRow::new().with_text(Column::Code, "01"),
            CategoryRow::new().with_text(Column::Code, "02").with_text(Column::Title, ""),
        ];
        let mut out = Vec::new();
        let err = Renderer::new(40, COICOP)
            .write_categories(&mut out, &rows)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingMandatoryColumns { ref missing } if missing == &[Column::Title]
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_mandatory_may_come_from_different_rows() {
        let rows = vec![
            CategoryRow::new().with_text(Column::Code, "01"),
            CategoryRow::new().with_text(Column::Title, "Drinks"),
        ];
        let out = render_many(&rows, 40).unwrap();
        assert_eq!(out, "            01 - \n               - Drinks\n");
    }
}
