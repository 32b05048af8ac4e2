//! Transcript models from UCSC refGene tables
//!
//! Column layout (tab separated, `bin` first):
//!
//! ```text
//! bin name chrom strand txStart txEnd cdsStart cdsEnd exonCount
//! exonStarts exonEnds score name2 [cdsStartStat cdsEndStat exonFrames]
//! ```
//!
//! Coordinates are 0-based half-open as in the UCSC tables. Exons are
//! numbered from 1 in transcript orientation.

use crate::core::error::{FormatError, FormatResult};
use crate::core::io::{for_each_record, open_text, parse_u64};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

const MIN_FIELDS: usize = 13;

/// Strand direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn is_forward(self) -> bool {
        self == Strand::Plus
    }
}

/// One exon of a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    /// 1-based exon number in transcript orientation
    pub number: u32,
    pub start: u64,
    pub end: u64,
}

impl Exon {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Transcript model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Accession without version (NM_007294)
    pub name: String,
    /// Accession version, if the table carried one
    pub version: Option<u32>,
    pub gene: String,
    pub chrom: String,
    pub strand: Strand,
    pub tx_start: u64,
    pub tx_end: u64,
    pub cds_start: u64,
    pub cds_end: u64,
    /// Exons in transcript orientation (reversed genomic order on `-`)
    pub exons: Vec<Exon>,
    /// Reading frame per exon in genomic order, -1 for non-coding
    pub exon_frames: Vec<i32>,
}

impl Transcript {
    /// Versioned accession (NM_007294.4), or the bare name without a version
    pub fn full_name(&self) -> String {
        match self.version {
            Some(v) => format!("{}.{}", self.name, v),
            None => self.name.clone(),
        }
    }

    pub fn is_coding(&self) -> bool {
        self.cds_start < self.cds_end
    }

    /// Exon containing a 0-based genomic position
    pub fn exon_at(&self, pos: u64) -> Option<&Exon> {
        self.exons.iter().find(|e| e.start <= pos && pos < e.end)
    }

    /// Parse one refGene row
    pub fn from_fields(line: usize, fields: &[&str]) -> FormatResult<Self> {
        if fields.len() < MIN_FIELDS {
            return Err(FormatError::TooFewFields {
                line,
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        let (name, version) = split_version(fields[1], line)?;
        let strand = Strand::parse(fields[3]).ok_or_else(|| FormatError::InvalidRecord {
            line,
            message: format!("strand must be '+' or '-', got '{}'", fields[3]),
        })?;

        let starts = parse_coordinate_list(fields[9], "exonStarts", line)?;
        let ends = parse_coordinate_list(fields[10], "exonEnds", line)?;
        if starts.len() != ends.len() {
            return Err(FormatError::InvalidRecord {
                line,
                message: format!(
                    "{} exon starts but {} exon ends",
                    starts.len(),
                    ends.len()
                ),
            });
        }

        let mut spans: Vec<(u64, u64)> = starts.into_iter().zip(ends).collect();
        if let Some(&(start, end)) = spans.iter().find(|(s, e)| s > e) {
            return Err(FormatError::InvalidRecord {
                line,
                message: format!("exon start ({start}) > end ({end})"),
            });
        }
        if !strand.is_forward() {
            spans.reverse();
        }
        let exons = spans
            .into_iter()
            .zip(1u32..)
            .map(|((start, end), number)| Exon { number, start, end })
            .collect();

        let exon_frames = match fields.get(15) {
            Some(frames) => parse_frame_list(frames, line)?,
            None => Vec::new(),
        };

        Ok(Self {
            name,
            version,
            gene: fields[12].to_string(),
            chrom: fields[2].to_string(),
            strand,
            tx_start: parse_u64(fields[4], "txStart", line)?,
            tx_end: parse_u64(fields[5], "txEnd", line)?,
            cds_start: parse_u64(fields[6], "cdsStart", line)?,
            cds_end: parse_u64(fields[7], "cdsEnd", line)?,
            exons,
            exon_frames,
        })
    }
}

fn split_version(accession: &str, line: usize) -> FormatResult<(String, Option<u32>)> {
    match accession.split_once('.') {
        Some((name, version)) => {
            let version = version.parse().map_err(|_| FormatError::InvalidNumber {
                line,
                field: "version",
                value: version.to_string(),
            })?;
            Ok((name.to_string(), Some(version)))
        }
        None => Ok((accession.to_string(), None)),
    }
}

/// Parse a comma-terminated list such as `100,200,`
fn parse_coordinate_list(list: &str, field: &'static str, line: usize) -> FormatResult<Vec<u64>> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| parse_u64(s, field, line))
        .collect()
}

fn parse_frame_list(list: &str, line: usize) -> FormatResult<Vec<i32>> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim().parse().map_err(|_| FormatError::InvalidNumber {
                line,
                field: "exonFrames",
                value: s.to_string(),
            })
        })
        .collect()
}

/// Transcript lookup keyed by both bare and versioned accession
#[derive(Debug, Clone, Default)]
pub struct TranscriptTable {
    transcripts: HashMap<String, Arc<Transcript>>,
    count: usize,
}

impl TranscriptTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::from_reader(open_text(path)?)
    }

    /// Parse a refGene table; later rows win for a repeated accession
    pub fn from_reader<R: BufRead>(reader: R) -> FormatResult<Self> {
        let mut table = Self::default();
        for_each_record(reader, |line, fields| {
            table.insert(Transcript::from_fields(line, fields)?);
            Ok(())
        })?;
        Ok(table)
    }

    fn insert(&mut self, transcript: Transcript) {
        let transcript = Arc::new(transcript);
        self.count += 1;
        self.transcripts
            .insert(transcript.full_name(), Arc::clone(&transcript));
        self.transcripts.insert(transcript.name.clone(), transcript);
    }

    /// Look up by `NM_007294` or `NM_007294.4`
    pub fn get(&self, accession: &str) -> Option<&Arc<Transcript>> {
        self.transcripts.get(accession)
    }

    pub fn contains(&self, accession: &str) -> bool {
        self.transcripts.contains_key(accession)
    }

    /// Number of rows loaded
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
