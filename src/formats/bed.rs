//! BED-like interval sets
//!
//! Domains, hotspots, curated regions and population-max LoF exons all share
//! the layout `chrom  start  end  name  [extra...]` (0-based, half-open).
//! Intervals are indexed per chromosome with rust-lapper for O(log n + k)
//! overlap queries.

use crate::core::error::{FormatError, FormatResult};
use crate::core::io::{for_each_record, open_text, parse_u64};
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Payload carried by each interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Chromosome as written in the file
    pub chrom: String,
    /// Name column (domain id, hotspot label, exon key, ...)
    pub name: String,
    /// Columns after the name
    pub extra: Vec<String>,
}

/// Type alias for indexed regions
pub type RegionInterval = Interval<u64, Region>;

/// Interval set organized by chromosome
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    maps: HashMap<String, Lapper<u64, Region>>,
    /// Normalized chromosome name mapping (lowercase, no "chr" -> original)
    chrom_aliases: HashMap<String, String>,
}

impl IntervalSet {
    /// Load a BED-like file (plain, gzip or bzip2)
    pub fn from_path<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::from_reader(open_text(path)?)
    }

    /// Parse BED-like records from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> FormatResult<Self> {
        let mut by_chrom: HashMap<String, Vec<RegionInterval>> = HashMap::new();

        for_each_record(reader, |line, fields| {
            if fields.len() < 4 {
                return Err(FormatError::TooFewFields {
                    line,
                    expected: 4,
                    found: fields.len(),
                });
            }
            let start = parse_u64(fields[1], "start", line)?;
            let end = parse_u64(fields[2], "end", line)?;
            if start > end {
                return Err(FormatError::InvalidRecord {
                    line,
                    message: format!("start ({start}) > end ({end})"),
                });
            }

            let chrom = fields[0].to_string();
            by_chrom.entry(chrom.clone()).or_default().push(Interval {
                start,
                stop: end,
                val: Region {
                    chrom,
                    name: fields[3].to_string(),
                    extra: fields[4..].iter().map(|s| s.to_string()).collect(),
                },
            });
            Ok(())
        })?;

        Ok(Self::from_intervals(by_chrom))
    }

    /// Build the index from intervals grouped by chromosome
    pub fn from_intervals(by_chrom: HashMap<String, Vec<RegionInterval>>) -> Self {
        let mut maps = HashMap::new();
        let mut chrom_aliases = HashMap::new();

        for (chrom, intervals) in by_chrom {
            chrom_aliases.insert(normalize_chrom_key(&chrom), chrom.clone());
            maps.insert(chrom, Lapper::new(intervals));
        }

        Self { maps, chrom_aliases }
    }

    /// Regions overlapping `[start, end)`
    ///
    /// Accepts chromosome name variants (chr1, 1, CHR1).
    pub fn query(&self, chrom: &str, start: u64, end: u64) -> Vec<&Region> {
        self.query_intervals(chrom, start, end)
            .into_iter()
            .map(|iv| &iv.val)
            .collect()
    }

    /// Overlapping intervals with their coordinates
    pub fn query_intervals(&self, chrom: &str, start: u64, end: u64) -> Vec<&RegionInterval> {
        if end <= start {
            return vec![];
        }
        match self.find_lapper(chrom) {
            Some(l) => l.find(start, end).collect(),
            None => vec![],
        }
    }

    /// Regions containing a single 0-based position
    pub fn covering(&self, chrom: &str, pos: u64) -> Vec<&Region> {
        // half-open intervals never contain u64::MAX
        self.query(chrom, pos, pos.saturating_add(1))
    }

    /// Find the Lapper for a chromosome, trying different naming styles
    fn find_lapper(&self, chrom: &str) -> Option<&Lapper<u64, Region>> {
        if let Some(l) = self.maps.get(chrom) {
            return Some(l);
        }

        let normalized = normalize_chrom_key(chrom);
        self.chrom_aliases
            .get(&normalized)
            .and_then(|original| self.maps.get(original))
    }

    /// Check if a chromosome exists in the set
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.find_lapper(chrom).is_some()
    }

    /// Get all chromosome names
    pub fn chroms(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(|s| s.as_str())
    }

    /// Get the number of intervals for a chromosome
    pub fn interval_count(&self, chrom: &str) -> usize {
        self.find_lapper(chrom).map(|l| l.len()).unwrap_or(0)
    }

    /// Get total number of intervals across all chromosomes
    pub fn len(&self) -> usize {
        self.maps.values().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize chromosome name for flexible matching
///
/// Converts to lowercase and removes the "chr" prefix.
pub(crate) fn normalize_chrom_key(chrom: &str) -> String {
    let lower = chrom.to_lowercase();
    match lower.strip_prefix("chr") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAINS: &[u8] = b"\
chr17\t43044294\t43045802\tBRCA1_RING\tPF00097
chr17\t43104867\t43104956\tBRCA1_BRCT\tPF00533
chr17\t43045000\t43050000\tBRCA1_coiled\t
chr13\t32315507\t32400268\tBRCA2\n";

    fn create_test_set() -> IntervalSet {
        IntervalSet::from_reader(DOMAINS).unwrap()
    }

    #[test]
    fn test_set_creation() {
        let set = create_test_set();
        assert!(set.has_chrom("chr17"));
        assert!(set.has_chrom("chr13"));
        assert!(!set.has_chrom("chr1"));
        assert_eq!(set.len(), 4);
        assert_eq!(set.interval_count("chr17"), 3);
    }

    #[test]
    fn test_query_overlaps() {
        let set = create_test_set();

        let mut names: Vec<&str> = set
            .query("chr17", 43045500, 43045600)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["BRCA1_RING", "BRCA1_coiled"]);
    }

    #[test]
    fn test_half_open_boundaries() {
        let set = create_test_set();

        // end coordinate is exclusive
        assert!(set.covering("chr13", 32400268).is_empty());
        assert_eq!(set.covering("chr13", 32400267).len(), 1);
        assert_eq!(set.covering("chr13", 32315507).len(), 1);
        assert!(set.covering("chr13", 32315506).is_empty());
        assert!(set.covering("chr13", u64::MAX).is_empty());
        assert!(set.query_intervals("chr13", u64::MAX, u64::MAX).is_empty());
    }

    #[test]
    fn test_payload_columns() {
        let set = create_test_set();
        let hits = set.covering("chr17", 43104900);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "BRCA1_BRCT");
        assert_eq!(hits[0].extra, vec!["PF00533".to_string()]);
        assert_eq!(hits[0].chrom, "chr17");
    }

    #[test]
    fn test_chrom_name_variants() {
        let set = create_test_set();
        assert!(set.has_chrom("17"));
        assert!(set.has_chrom("CHR17"));
        assert_eq!(
            set.covering("17", 43104900).len(),
            set.covering("chr17", 43104900).len()
        );
    }

    #[test]
    fn test_empty_query_range() {
        let set = create_test_set();
        assert!(set.query("chr17", 43045500, 43045500).is_empty());
    }

    #[test]
    fn test_too_few_columns() {
        let err = IntervalSet::from_reader(&b"chr1\t10\t20\n"[..]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TooFewFields { line: 1, expected: 4, found: 3 }
        ));
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let err = IntervalSet::from_reader(&b"chr1\t20\t10\tx\n"[..]).unwrap_err();
        assert!(matches!(err, FormatError::InvalidRecord { line: 1, .. }));
    }

    #[test]
    fn test_bad_coordinate() {
        let err = IntervalSet::from_reader(&b"chr1\tten\t20\tx\n"[..]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidNumber { field: "start", .. }
        ));
    }

    #[test]
    fn test_normalize_chrom_key() {
        assert_eq!(normalize_chrom_key("chrX"), "x");
        assert_eq!(normalize_chrom_key("X"), "x");
        assert_eq!(normalize_chrom_key("Chr1"), "1");
    }
}
