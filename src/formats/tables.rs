//! Build-independent lookup tables
//!
//! All three tables are tab-separated with the key in the first column and
//! the value in the second: PVS1 severity levels, previous/alias gene
//! symbols, and the gene ↔ canonical transcript mapping.

use crate::core::error::{FormatError, FormatResult};
use crate::core::io::{for_each_record, open_text};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Read a `key\tvalue` table; later duplicate keys overwrite earlier ones
pub fn read_key_value_table<R: BufRead>(reader: R) -> FormatResult<HashMap<String, String>> {
    let mut table = HashMap::new();
    for_each_record(reader, |line, fields| {
        let (key, value) = key_value(line, fields)?;
        table.insert(key.to_string(), value.to_string());
        Ok(())
    })?;
    Ok(table)
}

fn key_value<'a>(line: usize, fields: &[&'a str]) -> FormatResult<(&'a str, &'a str)> {
    match fields {
        &[key, value, ..] => Ok((key.trim(), value.trim())),
        _ => Err(FormatError::TooFewFields {
            line,
            expected: 2,
            found: fields.len(),
        }),
    }
}

/// PVS1 severity level per classification key
#[derive(Debug, Clone, Default)]
pub struct Pvs1Levels {
    levels: HashMap<String, String>,
}

impl Pvs1Levels {
    pub fn from_path<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::from_reader(open_text(path)?)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> FormatResult<Self> {
        Ok(Self {
            levels: read_key_value_table(reader)?,
        })
    }

    pub fn level(&self, key: &str) -> Option<&str> {
        self.levels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Alternate/historical gene symbol → current symbol
#[derive(Debug, Clone, Default)]
pub struct GeneAliases {
    aliases: HashMap<String, String>,
}

impl GeneAliases {
    pub fn from_path<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::from_reader(open_text(path)?)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> FormatResult<Self> {
        Ok(Self {
            aliases: read_key_value_table(reader)?,
        })
    }

    /// Current symbol for an alias, if the symbol is a known alias
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Current symbol for `symbol`, or `symbol` itself when it is not an alias
    pub fn canonical<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.get(symbol).unwrap_or(symbol)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Gene symbol ↔ canonical transcript, one transcript per gene
///
/// Both directions are built from the same rows, so for every loaded pair
/// `(g, t)`, `transcript(g) == t` and `gene(t) == g`.
#[derive(Debug, Clone, Default)]
pub struct GeneTranscriptMap {
    gene_trans: HashMap<String, String>,
    trans_gene: HashMap<String, String>,
}

impl GeneTranscriptMap {
    pub fn from_path<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::from_reader(open_text(path)?)
    }

    /// Build both mappings from `gene\ttranscript` rows
    ///
    /// Repeating an identical row is allowed; mapping a gene or transcript
    /// to a second, different partner fails with
    /// [`FormatError::ConflictingMapping`] instead of letting the later row
    /// win. A gene list with such rows therefore makes
    /// `ReferenceRegistry::open` fail until the duplicate is removed.
    pub fn from_reader<R: BufRead>(reader: R) -> FormatResult<Self> {
        let mut map = Self::default();
        for_each_record(reader, |line, fields| {
            let (gene, trans) = key_value(line, fields)?;
            map.insert(line, gene, trans)
        })?;
        Ok(map)
    }

    fn insert(&mut self, line: usize, gene: &str, trans: &str) -> FormatResult<()> {
        check_unique(&self.gene_trans, line, gene, trans)?;
        check_unique(&self.trans_gene, line, trans, gene)?;
        self.gene_trans.insert(gene.to_string(), trans.to_string());
        self.trans_gene.insert(trans.to_string(), gene.to_string());
        Ok(())
    }

    /// Canonical transcript of a gene
    pub fn transcript(&self, gene: &str) -> Option<&str> {
        self.gene_trans.get(gene).map(String::as_str)
    }

    /// Gene owning a transcript
    pub fn gene(&self, transcript: &str) -> Option<&str> {
        self.trans_gene.get(transcript).map(String::as_str)
    }

    /// Gene symbol → transcript id
    pub fn gene_trans(&self) -> &HashMap<String, String> {
        &self.gene_trans
    }

    /// Transcript id → gene symbol
    pub fn trans_gene(&self) -> &HashMap<String, String> {
        &self.trans_gene
    }

    pub fn len(&self) -> usize {
        self.gene_trans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gene_trans.is_empty()
    }
}

fn check_unique(map: &HashMap<String, String>, line: usize, key: &str, value: &str) -> FormatResult<()> {
    match map.get(key) {
        Some(existing) if existing != value => Err(FormatError::ConflictingMapping {
            line,
            key: key.to_string(),
            existing: existing.clone(),
            new: value.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_trans_scenario() {
        let data = b"BRCA1\tNM_007294\nTP53\tNM_000546\n";
        let map = GeneTranscriptMap::from_reader(&data[..]).unwrap();

        assert_eq!(map.transcript("BRCA1"), Some("NM_007294"));
        assert_eq!(map.gene("NM_000546"), Some("TP53"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.gene_trans()["TP53"], "NM_000546");
        assert_eq!(map.trans_gene()["NM_007294"], "BRCA1");
    }

    #[test]
    fn test_gene_trans_duplicate_identical_row() {
        let data = b"BRCA1\tNM_007294\nBRCA1\tNM_007294\n";
        let map = GeneTranscriptMap::from_reader(&data[..]).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_gene_trans_conflicting_gene() {
        let data = b"BRCA1\tNM_007294\nBRCA1\tNM_007300\n";
        let err = GeneTranscriptMap::from_reader(&data[..]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::ConflictingMapping { line: 2, ref key, .. } if key == "BRCA1"
        ));
    }

    #[test]
    fn test_gene_trans_conflicting_transcript() {
        let data = b"BRCA1\tNM_007294\nBRCA1-AS\tNM_007294\n";
        let err = GeneTranscriptMap::from_reader(&data[..]).unwrap_err();
        assert!(matches!(err, FormatError::ConflictingMapping { line: 2, .. }));
    }

    #[test]
    fn test_single_column_row_rejected() {
        let data = b"BRCA1\tNM_007294\nTP53\n";
        let err = GeneTranscriptMap::from_reader(&data[..]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TooFewFields { line: 2, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_aliases_canonical() {
        let data = b"FAM175A\tABRAXAS1\nC11orf30\tEMSY\n";
        let aliases = GeneAliases::from_reader(&data[..]).unwrap();

        assert_eq!(aliases.canonical("FAM175A"), "ABRAXAS1");
        assert_eq!(aliases.canonical("BRCA2"), "BRCA2");
        assert_eq!(aliases.get("BRCA2"), None);
    }

    #[test]
    fn test_levels_later_rows_overwrite() {
        let data = b"# gene\tlevel\nPTEN\tS\nPTEN\tVS\nTTN\tNA\n";
        let levels = Pvs1Levels::from_reader(&data[..]).unwrap();

        assert_eq!(levels.level("PTEN"), Some("VS"));
        assert_eq!(levels.level("TTN"), Some("NA"));
        assert_eq!(levels.len(), 2);
    }
}
