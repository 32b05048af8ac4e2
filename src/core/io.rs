//! File access helpers shared by the loaders
//!
//! Text tables are opened through [`open_text`], which transparently handles
//! gzip and bzip2 input.

use crate::core::error::{FormatError, FormatResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip or bgzip compressed (.gz, .bgz)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

/// Detect compression format from file path and/or content
///
/// Extension wins; otherwise the first bytes are checked for the
/// gzip (1f 8b) or bzip2 ("BZh") magic.
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    if extension == "gz" || extension == "bgz" {
        return Ok(CompressionFormat::Gzip);
    }
    if extension == "bz2" {
        return Ok(CompressionFormat::Bzip2);
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let bytes_read = file.read(&mut magic)?;

    Ok(sniff_magic(&magic[..bytes_read]))
}

fn sniff_magic(magic: &[u8]) -> CompressionFormat {
    if magic.len() >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        CompressionFormat::Gzip
    } else if magic.len() >= 3 && magic[..3] == *b"BZh" {
        CompressionFormat::Bzip2
    } else {
        CompressionFormat::Plain
    }
}

/// Open a text file for line-oriented reading, decompressing if needed
pub fn open_text<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let format = detect_compression(path)?;
    let file = File::open(path)?;

    let reader: Box<dyn BufRead> = match format {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            flate2::read::MultiGzDecoder::new(file),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            bzip2::read::BzDecoder::new(file),
        )),
        CompressionFormat::Plain => Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file)),
    };
    Ok(reader)
}

/// Visit every data row of a tab-separated file
///
/// Blank lines and `#` comments are skipped. The callback receives the
/// 1-based line number and the tab-split fields.
pub fn for_each_record<R, F>(reader: R, mut visit: F) -> FormatResult<()>
where
    R: BufRead,
    F: FnMut(usize, &[&str]) -> FormatResult<()>,
{
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').collect();
        visit(index + 1, &fields)?;
    }
    Ok(())
}

/// Parse an unsigned integer column, reporting the field name on failure
pub fn parse_u64(value: &str, field: &'static str, line: usize) -> FormatResult<u64> {
    value.trim().parse().map_err(|_| FormatError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}
