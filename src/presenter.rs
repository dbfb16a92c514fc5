//! Console output: listing tables and confirmation lines.

use std::fmt;
use std::io::{self, Write};

use crate::models::RemoteFile;

/// Prefix of the browser link to a Drive object.
pub const SHARE_LINK_PREFIX: &str = "https://drive.google.com/open?id=";

/// Blank columns added to the widest cell of each column.
const COLUMN_PADDING: usize = 4;

const HEADERS: [&str; 4] = ["file name", "create time", "type", "link"];

/// Browser link to the object with `id`.
pub fn share_link(id: &str) -> String {
    format!("{}{}", SHARE_LINK_PREFIX, id)
}

/// Center-aligned text table of remote files.
#[derive(Debug)]
pub struct FileTable {
    rows: Vec<[String; 4]>,
    widths: [usize; 4],
}

impl FileTable {
    pub fn new(files: &[RemoteFile]) -> Self {
        let rows: Vec<[String; 4]> = files
            .iter()
            .map(|file| {
                [
                    file.name.clone(),
                    file.created_time_display(),
                    file.mime_type.clone().unwrap_or_else(|| "-".to_string()),
                    share_link(&file.id),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        Self {
            rows,
            widths: widths.map(|w| w + COLUMN_PADDING),
        }
    }

    /// Rendered width of each column, borders excluded.
    pub fn widths(&self) -> [usize; 4] {
        self.widths
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn write_border(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for width in self.widths {
            write!(f, "+{}", "-".repeat(width))?;
        }
        writeln!(f, "+")
    }

    fn write_row<S: AsRef<str>>(&self, f: &mut fmt::Formatter<'_>, cells: &[S]) -> fmt::Result {
        for (cell, width) in cells.iter().zip(self.widths) {
            write!(f, "|{:^width$}", cell.as_ref(), width = width)?;
        }
        writeln!(f, "|")
    }
}

impl fmt::Display for FileTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_border(f)?;
        self.write_row(f, &HEADERS)?;
        self.write_border(f)?;
        for row in &self.rows {
            self.write_row(f, row)?;
        }
        self.write_border(f)
    }
}

/// Print the result of a folder listing.
pub fn write_listing<W: Write>(out: &mut W, folder_id: &str, files: &[RemoteFile]) -> io::Result<()> {
    if files.is_empty() {
        return writeln!(out, "No files found.");
    }

    writeln!(out, "Found {} files under folder: {}.", files.len(), folder_id)?;
    write!(out, "{}", FileTable::new(files))
}

/// Print the confirmation of an upload.
pub fn write_file_created<W: Write>(out: &mut W, file: &RemoteFile) -> io::Result<()> {
    writeln!(out, "Success. File link: {}", share_link(&file.id))
}

/// Print the confirmation of a folder creation.
pub fn write_folder_created<W: Write>(out: &mut W, folder: &RemoteFile) -> io::Result<()> {
    writeln!(out, "Success. Folder link: {}", share_link(&folder.id))
}
