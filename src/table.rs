// src/table.rs

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::ScrapeError;

/// One row of text cells, as scraped.
pub type TableRow = Vec<String>;

/// The header row plus data rows of the table on one results page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    pub header: TableRow,
    pub rows: Vec<TableRow>,
}

impl PageResult {
    pub fn new(header: TableRow, rows: Vec<TableRow>) -> Self {
        Self { header, rows }
    }

    /// `[header] ++ rows`, the shape a page contributes to aggregation.
    pub fn into_rows(self) -> Vec<TableRow> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.header);
        out.extend(self.rows);
        out
    }
}

fn selector(css: &str, url: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse {
        url: url.to_string(),
        reason: format!("invalid selector {:?}: {:?}", css, e),
    })
}

/// Elements that start a new line when rendered.
const LINE_BREAKING: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "table", "tr", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Visible text of a cell: text nodes in document order, with line breaks
/// (`<br>`, block elements) turned into spaces and whitespace runs collapsed.
/// Inline markup such as `<sup>` or `<a>` does not split words.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if LINE_BREAKING.contains(&el.name()) => raw.push(' '),
            _ => {}
        }
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the first table matching `table_selector` from `html`.
///
/// The header is every `th` in the table. Data rows come from every `tr`
/// after the first, one cell per `td`; a `tr` without `td`s becomes an empty
/// row. `url` is only used for error context.
pub fn parse_table(html: &str, table_selector: &str, url: &str) -> Result<PageResult, ScrapeError> {
    let table_sel = selector(table_selector, url)?;
    let th = selector("th", url)?;
    let tr = selector("tr", url)?;
    let td = selector("td", url)?;

    let doc = Html::parse_document(html);
    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScrapeError::Parse {
            url: url.to_string(),
            reason: format!("no element matches {:?}", table_selector),
        })?;

    let header: TableRow = table.select(&th).map(cell_text).collect();
    let rows: Vec<TableRow> = table
        .select(&tr)
        .skip(1)
        .map(|row| row.select(&td).map(cell_text).collect())
        .collect();

    Ok(PageResult { header, rows })
}
