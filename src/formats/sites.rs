//! Known pathogenic sites
//!
//! Tab-separated `chrom  pos  [annotation...]`, keyed by `chrom:pos`.

use crate::core::error::{FormatError, FormatResult};
use crate::core::io::{for_each_record, open_text, parse_u64};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// A pathogenic position and the annotation columns that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathogenicSite {
    pub chrom: String,
    pub pos: u64,
    pub annotation: Vec<String>,
}

impl PathogenicSite {
    pub fn key(&self) -> String {
        site_key(&self.chrom, self.pos)
    }
}

/// Lookup key for a site
pub fn site_key(chrom: &str, pos: u64) -> String {
    format!("{chrom}:{pos}")
}

/// Pathogenic sites keyed by `chrom:pos`
#[derive(Debug, Clone, Default)]
pub struct PathogenicSites {
    sites: HashMap<String, PathogenicSite>,
}

impl PathogenicSites {
    pub fn from_path<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::from_reader(open_text(path)?)
    }

    /// Parse sites; a repeated position keeps the last row
    pub fn from_reader<R: BufRead>(reader: R) -> FormatResult<Self> {
        let mut sites = HashMap::new();
        for_each_record(reader, |line, fields| {
            if fields.len() < 2 {
                return Err(FormatError::TooFewFields {
                    line,
                    expected: 2,
                    found: fields.len(),
                });
            }
            let site = PathogenicSite {
                chrom: fields[0].to_string(),
                pos: parse_u64(fields[1], "pos", line)?,
                annotation: fields[2..].iter().map(|s| s.to_string()).collect(),
            };
            sites.insert(site.key(), site);
            Ok(())
        })?;
        Ok(Self { sites })
    }

    pub fn get(&self, chrom: &str, pos: u64) -> Option<&PathogenicSite> {
        self.sites.get(&site_key(chrom, pos))
    }

    pub fn get_by_key(&self, key: &str) -> Option<&PathogenicSite> {
        self.sites.get(key)
    }

    pub fn contains(&self, chrom: &str, pos: u64) -> bool {
        self.get(chrom, pos).is_some()
    }

    /// Sites on `chrom` within `[start, end]`, in no particular order
    pub fn in_range(&self, chrom: &str, start: u64, end: u64) -> impl Iterator<Item = &PathogenicSite> + '_ {
        let chrom = chrom.to_string();
        self.sites
            .values()
            .filter(move |s| s.chrom == chrom && s.pos >= start && s.pos <= end)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITES: &[u8] = b"\
#chrom\tpos\tref\talt\tclnsig
17\t43045705\tT\tC\tPathogenic
17\t43045706\tA\tG\tLikely_pathogenic
17\t43045705\tT\tG\tPathogenic/Likely_pathogenic
";

    #[test]
    fn test_lookup_by_position() {
        let sites = PathogenicSites::from_reader(SITES).unwrap();
        assert_eq!(sites.len(), 2);
        assert!(sites.contains("17", 43045706));
        assert!(!sites.contains("17", 43045707));
        assert!(!sites.contains("chr17", 43045706));
    }

    #[test]
    fn test_repeated_position_keeps_last_row() {
        let sites = PathogenicSites::from_reader(SITES).unwrap();
        let site = sites.get_by_key("17:43045705").unwrap();
        assert_eq!(site.annotation, vec!["T", "G", "Pathogenic/Likely_pathogenic"]);
    }

    #[test]
    fn test_in_range() {
        let sites = PathogenicSites::from_reader(SITES).unwrap();
        assert_eq!(sites.in_range("17", 43045700, 43045710).count(), 2);
        assert_eq!(sites.in_range("17", 43045706, 43045706).count(), 1);
        assert_eq!(sites.in_range("13", 0, u64::MAX).count(), 0);
    }

    #[test]
    fn test_bad_position() {
        let err = PathogenicSites::from_reader(&b"17\tabc\n"[..]).unwrap_err();
        assert!(matches!(err, FormatError::InvalidNumber { field: "pos", line: 1, .. }));
    }
}
