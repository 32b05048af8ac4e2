//! pvs1-refdata - reference datasets for PVS1 variant annotation
//!
//! Configuration-driven, lazily cached access to the files a loss-of-function
//! annotation pipeline needs for each genome build.
//!
//! # Features
//!
//! - One INI file names every resource; relative paths resolve against the
//!   install directory, the genome against the working directory
//! - Gene/transcript, alias and PVS1 level tables loaded once at startup
//! - Genome, transcripts, interval sets and pathogenic sites loaded on first
//!   request per build, then shared
//! - Compressed (gzip, bzip2) flat files
//!
//! # Example
//!
//! ```ignore
//! use pvs1_refdata::ReferenceRegistry;
//!
//! let registry = ReferenceRegistry::open("/opt/autopvs1")?;
//! let transcript = registry.gene_trans().transcript("BRCA1");
//!
//! let grch38 = registry.get_build_data("GRCh38")?;
//! let bases = grch38.genome.fetch("chr17", 43044294, 43044304)?;
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use crate::core::registry::{default_install_dir, global, init};
pub use crate::core::{
    BuildDataset, Config, ConfigError, DatasetLoader, FileLoader, FormatError, PathResolution,
    RefDataError, ReferenceRegistry, ResourceKey, SequenceError,
};
pub use formats::{
    GeneAliases, GeneTranscriptMap, IndexedGenome, IntervalSet, PathogenicSites, Pvs1Levels,
    Transcript, TranscriptTable,
};
