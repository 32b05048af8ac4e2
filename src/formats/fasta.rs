//! Indexed FASTA access
//!
//! Wraps `noodles::fasta` with the rules the registry needs: the
//! samtools-style `<path>.fai` companion is built when missing or older
//! than the FASTA, a failed index write only warns, and sequence names
//! tolerate `chr`-prefix differences.

use crate::core::error::{FormatError, FormatResult, SequenceError, SequenceResult};
use crate::core::io::{detect_compression, CompressionFormat};
use crate::formats::bed::normalize_chrom_key;
use log::{debug, warn};
use noodles::core::{Position, Region};
use noodles::fasta::{self, fai};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

type Reader = fasta::io::IndexedReader<BufReader<File>>;

/// Name and length of one indexed sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub length: u64,
}

/// Path of the companion index for a FASTA file
pub fn companion_path(fasta: &Path) -> PathBuf {
    let mut name = fasta.as_os_str().to_os_string();
    name.push(".fai");
    PathBuf::from(name)
}

fn read_index(path: &Path) -> FormatResult<fai::Index> {
    let reader = File::open(path).map(BufReader::new)?;
    fai::io::Reader::new(reader)
        .read_index()
        .map_err(|e| layout_error(path, e))
}

fn build_index(fasta_path: &Path, fai_path: &Path) -> FormatResult<fai::Index> {
    debug!("Building FASTA index for {:?}", fasta_path);
    let index = fasta::io::index(fasta_path).map_err(|e| layout_error(fasta_path, e))?;

    let mut buf = Vec::new();
    let encoded = fai::io::Writer::new(&mut buf).write_index(&index);
    let written = encoded.and_then(|()| fs::write(fai_path, &buf));
    if let Err(e) = written {
        warn!("Could not write FASTA index {:?}: {}", fai_path, e);
    }
    Ok(index)
}

/// Index files older than their FASTA describe a previous genome
fn is_stale(fasta_path: &Path, fai_path: &Path) -> io::Result<bool> {
    let fasta_time = fs::metadata(fasta_path)?.modified()?;
    let fai_time = fs::metadata(fai_path)?.modified()?;
    Ok(fasta_time > fai_time)
}

fn layout_error(path: &Path, e: io::Error) -> FormatError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            FormatError::InvalidFasta(format!("{}: {}", path.display(), e))
        }
        _ => FormatError::Io(e),
    }
}

/// Random-access genome sequence
pub struct IndexedGenome {
    path: PathBuf,
    contigs: Vec<Contig>,
    by_name: HashMap<String, usize>,
    chrom_aliases: HashMap<String, usize>,
    reader: Mutex<Reader>,
}

impl std::fmt::Debug for IndexedGenome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedGenome")
            .field("path", &self.path)
            .field("sequences", &self.contigs.len())
            .finish()
    }
}

impl IndexedGenome {
    /// Open a FASTA file, loading `<path>.fai` or (re)building it
    pub fn open<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        let path = path.as_ref();
        if detect_compression(path)? != CompressionFormat::Plain {
            return Err(FormatError::UnsupportedCompression(format!(
                "{} (genome FASTA must be uncompressed)",
                path.display()
            )));
        }

        let fai_path = companion_path(path);
        let index = if !fai_path.exists() {
            build_index(path, &fai_path)?
        } else if is_stale(path, &fai_path).unwrap_or(true) {
            warn!("FASTA index {:?} is older than {:?}; rebuilding", fai_path, path);
            build_index(path, &fai_path)?
        } else {
            debug!("Reading FASTA index {:?}", fai_path);
            read_index(&fai_path)?
        };

        let file = File::open(path).map(BufReader::new)?;
        Ok(Self::from_parts(path.to_path_buf(), file, index))
    }

    fn from_parts(path: PathBuf, file: BufReader<File>, index: fai::Index) -> Self {
        let contigs: Vec<Contig> = index
            .as_ref()
            .iter()
            .map(|record| Contig {
                name: String::from_utf8_lossy(record.name()).to_string(),
                length: record.length(),
            })
            .collect();

        let mut by_name = HashMap::new();
        let mut chrom_aliases = HashMap::new();
        for (i, contig) in contigs.iter().enumerate() {
            by_name.insert(contig.name.clone(), i);
            chrom_aliases
                .entry(normalize_chrom_key(&contig.name))
                .or_insert(i);
        }

        Self {
            path,
            contigs,
            by_name,
            chrom_aliases,
            reader: Mutex::new(fasta::io::IndexedReader::new(file, index)),
        }
    }

    fn contig(&self, name: &str) -> SequenceResult<&Contig> {
        self.by_name
            .get(name)
            .or_else(|| self.chrom_aliases.get(&normalize_chrom_key(name)))
            .map(|&i| &self.contigs[i])
            .ok_or_else(|| SequenceError::UnknownSequence(name.to_string()))
    }

    fn reader(&self) -> MutexGuard<'_, Reader> {
        self.reader.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch `[start, end)` (0-based) of a sequence, as stored in the file
    ///
    /// Sequence names match exactly first, then by chr-prefix variant.
    pub fn fetch(&self, name: &str, start: u64, end: u64) -> SequenceResult<String> {
        if start > end {
            return Err(SequenceError::InvalidRange { start, end });
        }
        let contig = self.contig(name)?;
        if end > contig.length {
            return Err(SequenceError::OutOfBounds {
                name: name.to_string(),
                start,
                end,
                length: contig.length,
            });
        }
        if start == end {
            return Ok(String::new());
        }

        let read_error = |message: String| SequenceError::Read {
            name: name.to_string(),
            message,
        };
        let first = Position::try_from(start as usize + 1).map_err(|e| read_error(e.to_string()))?;
        let last = Position::try_from(end as usize).map_err(|e| read_error(e.to_string()))?;
        let region = Region::new(contig.name.as_str(), first..=last);

        let record = self
            .reader()
            .query(&region)
            .map_err(|e| read_error(e.to_string()))?;
        Ok(String::from_utf8_lossy(record.sequence().as_ref()).into_owned())
    }

    /// Length of a sequence
    pub fn sequence_len(&self, name: &str) -> Option<u64> {
        self.contig(name).ok().map(|c| c.length)
    }

    /// Sequence names in file order
    pub fn contigs(&self) -> impl Iterator<Item = &str> {
        self.contigs.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
