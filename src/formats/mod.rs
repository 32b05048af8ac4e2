//! Reference file formats
//!
//! Loaders for the flat files named by the configuration.

pub mod bed;
pub mod fasta;
pub mod refgene;
pub mod sites;
pub mod tables;

pub use bed::{IntervalSet, Region, RegionInterval};
pub use fasta::{companion_path, Contig, IndexedGenome};
pub use refgene::{Exon, Strand, Transcript, TranscriptTable};
pub use sites::{site_key, PathogenicSite, PathogenicSites};
pub use tables::{GeneAliases, GeneTranscriptMap, Pvs1Levels};
