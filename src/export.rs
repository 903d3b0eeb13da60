// src/export.rs

use calamine::{open_workbook, Reader, Xlsx};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::{aggregate::AggregatedDataset, error::ScrapeError, table::TableRow};

/// `<YYYY-MM-DD>_<dataset>.xlsx`
pub fn output_file_name(date: NaiveDate, dataset_name: &str) -> String {
    format!("{}_{}.xlsx", date.format("%Y-%m-%d"), dataset_name)
}

fn build_workbook(dataset: &AggregatedDataset) -> Result<Workbook, ScrapeError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (r, row) in dataset.rows().iter().enumerate() {
        let r = u32::try_from(r)
            .map_err(|_| ScrapeError::Spreadsheet(format!("row {} out of range", r)))?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c)
                .map_err(|_| ScrapeError::Spreadsheet(format!("column {} out of range", c)))?;
            sheet.write_string(r, c, cell)?;
        }
    }
    Ok(workbook)
}

/// Write `dataset` as a single-sheet workbook of text cells into
/// `output_dir` (created if missing) and return the file's path.
///
/// The workbook goes to a temp file in the same directory first and is
/// renamed into place, so a failed export never leaves a partial file.
#[instrument(level = "info", skip(dataset, output_dir), fields(rows = dataset.len()))]
pub fn export(
    dataset: &AggregatedDataset,
    output_dir: &Path,
    dataset_name: &str,
    date: NaiveDate,
) -> Result<PathBuf, ScrapeError> {
    fs::create_dir_all(output_dir).map_err(|e| ScrapeError::fs(output_dir, e))?;
    let path = output_dir.join(output_file_name(date, dataset_name));

    let bytes = build_workbook(dataset)?.save_to_buffer()?;
    debug!(bytes = bytes.len(), "workbook serialized");

    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".xlsx.tmp")
        .tempfile_in(output_dir)
        .map_err(|e| ScrapeError::fs(output_dir, e))?;
    tmp.write_all(&bytes)
        .map_err(|e| ScrapeError::fs(tmp.path(), e))?;
    tmp.persist(&path)
        .map_err(|e| ScrapeError::fs(&path, e.error))?;

    info!(path = %path.display(), "wrote spreadsheet");
    Ok(path)
}

/// Read the first sheet of an `.xlsx` back as text rows, anchored at A1.
/// Trailing blank cells are dropped from each row.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<TableRow>, ScrapeError> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    // the range begins at the first non-blank cell, not at A1
    let (row_off, col_off) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<TableRow> = vec![Vec::new(); row_off];
    rows.extend(range.rows().map(|cells| {
        let mut row: TableRow = std::iter::repeat(String::new())
            .take(col_off)
            .chain(cells.iter().map(|c| c.to_string()))
            .collect();
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
        row
    }));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::PageResult;
    use tempfile::tempdir;

    fn row(cells: &[&str]) -> TableRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sample() -> AggregatedDataset {
        AggregatedDataset::from_pages(vec![
            PageResult::new(
                row(&["ISIN", "Descrizione", "Cedola"]),
                vec![
                    row(&["IT0005240830", "Btp Fx 2,2% Jn27", "2,20"]),
                    row(&["XS1234567890", "Eni Tf 4% 2029", "4,00"]),
                ],
            ),
            PageResult::new(
                row(&["ISIN", "Descrizione", "Cedola"]),
                vec![row(&["IT0005398406", "Btp Tf 2,45% St50", "0012"])],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            output_file_name(date, "borsa-italiana"),
            "2024-05-01_borsa-italiana.xlsx"
        );
    }

    #[test]
    fn export_round_trips_text_rows() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let ds = sample();

        let path = export(&ds, tmp.path(), "borsa-italiana", date)?;
        assert_eq!(path, tmp.path().join("2024-05-01_borsa-italiana.xlsx"));

        let back = read_rows(&path)?;
        assert_eq!(back, ds.rows());
        // numeric-looking text stays text
        assert_eq!(back[3][2], "0012");
        Ok(())
    }

    #[test]
    fn round_trip_keeps_blank_leading_column_and_blank_header() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let icon_column = AggregatedDataset::from_pages(vec![PageResult::new(
            row(&["", "ISIN"]),
            vec![row(&["", "IT1"]), row(&["", "IT2"])],
        )])?;
        let path = export(&icon_column, tmp.path(), "icons", date)?;
        assert_eq!(read_rows(&path)?, icon_column.rows());

        let no_header = AggregatedDataset::from_pages(vec![PageResult::new(
            Vec::new(),
            vec![row(&["a", "b"]), row(&["c", "d"])],
        )])?;
        let path = export(&no_header, tmp.path(), "headerless", date)?;
        assert_eq!(
            read_rows(&path)?,
            vec![Vec::new(), row(&["a", "b"]), row(&["c", "d"])]
        );
        Ok(())
    }

    #[test]
    fn export_creates_nested_output_dir_and_leaves_no_temp_files() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("data").join("bonds");
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let path = export(&sample(), &out, "bonds", date)?;
        assert!(path.exists());

        let names: Vec<String> = fs::read_dir(&out)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["2025-01-31_bonds.xlsx"]);
        Ok(())
    }

    #[test]
    fn export_overwrites_same_day_file() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        export(&sample(), tmp.path(), "bonds", date)?;
        let header_only =
            AggregatedDataset::from_pages(vec![PageResult::new(row(&["ISIN"]), vec![])])?;
        let path = export(&header_only, tmp.path(), "bonds", date)?;

        assert_eq!(read_rows(&path)?, vec![row(&["ISIN"])]);
        Ok(())
    }

    #[test]
    fn read_rows_missing_file_is_spreadsheet_error() {
        let err = read_rows("/no/such/file.xlsx").unwrap_err();
        assert!(matches!(err, ScrapeError::Spreadsheet(_)));
    }
}
