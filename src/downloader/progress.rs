//! In-place terminal progress line
//!
//! Each update blanks the current line with a carriage return and rewrites it,
//! so the byte counter appears to tick in place.

use indicatif::DecimalBytes;
use std::io::Write;
use std::path::Path;

/// Width blanked before each redraw
const CLEAR_WIDTH: usize = 50;

/// Progress printer for a single download
///
/// Write failures are ignored: a closed stdout must not abort a transfer.
#[derive(Debug)]
pub struct ProgressLine<W: Write> {
    out: W,
    total: u64,
}

impl<W: Write> ProgressLine<W> {
    /// Create a progress line writing to `out`
    pub fn new(out: W) -> Self {
        Self { out, total: 0 }
    }

    /// Bytes reported so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Redraw the line with a new cumulative byte count
    pub fn update(&mut self, total: u64) {
        self.total = total;
        write!(
            self.out,
            "\r{}\rDownloading... {} complete",
            " ".repeat(CLEAR_WIDTH),
            DecimalBytes(total)
        )
        .ok();
        self.out.flush().ok();
    }

    /// Terminate the progress line and name the file being finalized
    pub fn finish(&mut self, path: &Path) {
        writeln!(self.out, "\nfile {}", path.display()).ok();
        self.out.flush().ok();
    }

    /// Consume the printer and return the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}
