//! Blob presentation with a size ceiling.
//!
//! Text within the ceiling is returned as is, binary content within the
//! ceiling as a hex dump. Anything larger comes back with metadata only;
//! an oversized blob is never an error.

use crate::git::object::Blob;
use crate::models::{BlobContent, BlobView, HexRow};

/// 500 KiB
pub const DEFAULT_MAX_BLOB_SIZE: u64 = 100 * 5 << 10;

const BYTES_PER_ROW: usize = 16;
const BYTES_PER_COLUMN: usize = 8;

pub fn read_blob(blob: &Blob, max_size: u64) -> BlobView {
    let is_binary = blob.is_binary();
    let truncated = blob.size() > max_size;

    let content = if truncated {
        None
    } else if let Some(text) = blob.text() {
        Some(BlobContent::Text { text: text.to_string() })
    } else {
        Some(BlobContent::HexDump { rows: hex_dump(&blob.data) })
    };

    BlobView {
        oid: blob.oid.to_string(),
        size: blob.size(),
        is_binary,
        truncated,
        content,
    }
}

/// Offset, space-separated byte columns and a printable rendering per row.
pub fn hex_dump(data: &[u8]) -> Vec<HexRow> {
    data.chunks(BYTES_PER_ROW)
        .enumerate()
        .map(|(idx, row)| HexRow {
            offset: format!("{:08x}", idx * BYTES_PER_ROW),
            columns: row
                .chunks(BYTES_PER_COLUMN)
                .map(|col| col.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "))
                .collect(),
            ascii: row
                .iter()
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect(),
        })
        .collect()
}
