use borsascraper::export::read_rows;
use std::{env, path::Path, process::exit};

/// Rows printed after the header unless a count is given.
const DEFAULT_PREVIEW: usize = 10;

fn main() {
    // Expect a path to an exported .xlsx, optionally followed by a row count.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <XLSX_FILE> [ROWS]", args[0]);
        exit(1);
    }
    let preview = match args.get(2).map(|s| s.parse::<usize>()) {
        None => DEFAULT_PREVIEW,
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            eprintln!("Invalid row count {:?}: {}", args[2], e);
            exit(1);
        }
    };
    if let Err(e) = inspect_xlsx(Path::new(&args[1]), preview) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

/// Print the header, shape and first `preview` data rows of the first sheet.
fn inspect_xlsx(path: &Path, preview: usize) -> Result<(), Box<dyn std::error::Error>> {
    let rows = read_rows(path)?;
    let file_size_disk = std::fs::metadata(path)?.len();

    println!("=== Workbook: {} ===", path.display());
    println!("File-size on disk:    {} bytes", file_size_disk);

    let Some((header, data)) = rows.split_first() else {
        println!("(empty sheet)");
        return Ok(());
    };

    let widest = data.iter().map(Vec::len).max().unwrap_or(0);
    println!("Header columns:       {}", header.len());
    println!("Data rows:            {}", data.len());
    if widest != header.len() {
        println!("Widest data row:      {} cells", widest);
    }
    println!();

    println!("=== Header ===");
    for (i, name) in header.iter().enumerate() {
        println!("- {:>3} | {}", i, name);
    }
    println!();

    println!("=== First {} rows ===", preview.min(data.len()));
    for row in data.iter().take(preview) {
        println!("{}", row.join(" | "));
    }
    Ok(())
}
