//! Result output
//!
//! Writes [`ResultRow`]s to an `.xlsx` workbook or a `.csv` file, chosen by the
//! output path's extension. An empty row set writes nothing.

use crate::error::{PubmedError, Result};
use crate::projector::{ResultRow, RESULT_COLUMNS};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Output file used when none is given
pub const DEFAULT_OUTPUT: &str = "results.xlsx";

/// Longest string a workbook cell accepts
const MAX_CELL_CHARS: usize = 32_767;

/// File format, picked from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// `.csv` (any case) means CSV; everything else is a workbook.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Xlsx,
        }
    }
}

/// Where to write and what to do afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkOptions {
    pub path: PathBuf,
    /// Launch the platform's default application on the written file
    pub open_after_save: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            open_after_save: false,
        }
    }
}

/// What [`save_rows`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { path: PathBuf, rows: usize },
    NothingToSave,
}

/// Save rows to `options.path`. Nothing is created when `rows` is empty.
pub fn save_rows(rows: &[ResultRow], options: &SinkOptions) -> Result<SaveOutcome> {
    if rows.is_empty() {
        info!("No results to save");
        return Ok(SaveOutcome::NothingToSave);
    }

    let path = options.path.as_path();
    match OutputFormat::from_path(path) {
        OutputFormat::Xlsx => write_xlsx(path, rows)?,
        OutputFormat::Csv => write_csv(path, rows)?,
    }
    info!(path = %path.display(), rows = rows.len(), "Results saved");

    if options.open_after_save {
        if let Err(e) = open_file(path) {
            warn!(path = %path.display(), error = %e, "Could not open output file");
        }
    }

    Ok(SaveOutcome::Written {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

fn write_xlsx(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, name) in RESULT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let sheet_row = idx as u32 + 1;
        for (col, value) in row.fields().iter().enumerate() {
            let cell = clip_cell(value);
            if cell.len() < value.len() {
                warn!(
                    pmid = %row.pubmed_id,
                    column = RESULT_COLUMNS[col],
                    chars = value.chars().count(),
                    "Cell too long for a workbook, truncating"
                );
            }
            worksheet.write_string(sheet_row, col as u16, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// First [`MAX_CELL_CHARS`] characters of `value`, cut on a char boundary.
fn clip_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

fn write_csv(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_path(path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Hand `path` to the desktop's default application without waiting for it.
pub fn open_file(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    debug!(path = %path.display(), "Opening output file");
    command.arg(path).spawn().map_err(PubmedError::Io)?;
    Ok(())
}
