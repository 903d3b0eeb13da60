// src/aggregate.rs

use crate::{
    error::ScrapeError,
    table::{PageResult, TableRow},
};

/// All rows of one run: a single leading header followed by data rows in
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedDataset {
    rows: Vec<TableRow>,
}

impl AggregatedDataset {
    /// Flatten `pages` in order. The very first row becomes the header; any
    /// later row that is empty or identical to it is dropped, which removes
    /// the header each subsequent page repeats.
    pub fn from_pages<I>(pages: I) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = PageResult>,
    {
        let mut flat = pages.into_iter().flat_map(PageResult::into_rows);
        let header = flat.next().ok_or(ScrapeError::EmptyDataset)?;

        let mut rows = vec![header];
        for row in flat {
            if !row.is_empty() && row != rows[0] {
                rows.push(row);
            }
        }
        Ok(Self { rows })
    }

    pub fn header(&self) -> &TableRow {
        &self.rows[0]
    }

    pub fn data_rows(&self) -> &[TableRow] {
        &self.rows[1..]
    }

    /// Header first, then data.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> TableRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn page(header: &[&str], rows: &[&[&str]]) -> PageResult {
        PageResult::new(row(header), rows.iter().map(|r| row(r)).collect())
    }

    #[test]
    fn repeated_headers_collapse_to_one() {
        let ds = AggregatedDataset::from_pages(vec![
            page(&["H1", "H2"], &[&["a", "b"]]),
            page(&["H1", "H2"], &[&["c", "d"]]),
        ])
        .unwrap();
        assert_eq!(
            ds.rows(),
            &[row(&["H1", "H2"]), row(&["a", "b"]), row(&["c", "d"])]
        );
        assert_eq!(ds.header(), &row(&["H1", "H2"]));
        assert_eq!(ds.data_rows().len(), 2);
    }

    #[test]
    fn empty_rows_and_header_copies_are_dropped() {
        let ds = AggregatedDataset::from_pages(vec![
            page(&["H1", "H2"], &[&[], &["a", "b"], &["H1", "H2"]]),
            page(&["H1", "H2"], &[&[], &[]]),
            page(&["H1", "H2"], &[&["e", "f"]]),
        ])
        .unwrap();
        assert_eq!(
            ds.rows(),
            &[row(&["H1", "H2"]), row(&["a", "b"]), row(&["e", "f"])]
        );
    }

    #[test]
    fn data_order_follows_page_order() {
        let pages: Vec<PageResult> = (1..=5)
            .map(|n| {
                let a = format!("p{n}r1");
                let b = format!("p{n}r2");
                page(&["ISIN"], &[&[a.as_str()], &[b.as_str()]])
            })
            .collect();
        let ds = AggregatedDataset::from_pages(pages).unwrap();

        assert_eq!(ds.len(), 11);
        let firsts: Vec<&str> = ds.data_rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            firsts,
            vec![
                "p1r1", "p1r2", "p2r1", "p2r2", "p3r1", "p3r2", "p4r1", "p4r2", "p5r1", "p5r2"
            ]
        );
    }

    #[test]
    fn differing_later_header_is_kept_as_data() {
        let ds = AggregatedDataset::from_pages(vec![
            page(&["H1", "H2"], &[&["a", "b"]]),
            page(&["H1", "H2 (EUR)"], &[]),
        ])
        .unwrap();
        assert_eq!(ds.data_rows(), &[row(&["a", "b"]), row(&["H1", "H2 (EUR)"])]);
    }

    #[test]
    fn single_page_without_data_is_header_only() {
        let ds = AggregatedDataset::from_pages(vec![page(&["H1", "H2"], &[])]).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.data_rows().is_empty());
    }

    #[test]
    fn no_pages_is_an_error() {
        let err = AggregatedDataset::from_pages(Vec::new()).unwrap_err();
        assert!(matches!(err, ScrapeError::EmptyDataset));
    }
}
