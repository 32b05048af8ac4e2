//! Shared fixtures: a small install directory with one GRCH38 build

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const FASTA: &str = ">chr17\nACGTACGTAC\nGTACGTACGT\nAAAA\n>chr13\nGGGGCCCC\n";

pub const REFGENE: &str = "1\tNM_007294.4\tchr17\t-\t0\t24\t2\t20\t2\t0,12,\t8,24,\t0\tBRCA1\tcmpl\tcmpl\t0,0,\n";

pub const DOMAINS: &str = "chr17\t0\t10\tRING\n";
pub const HOTSPOTS: &str = "chr17\t4\t6\tHS1\n";
pub const CURATED: &str = "chr13\t0\t8\tCR1\tcurated\n";
pub const EXON_POPMAX: &str = "chr17\t12\t24\tNM_007294|1\t0.0001\n";
pub const SITES: &str = "chr17\t5\tC\tT\tPathogenic\n";

/// Write shared tables, build files and a config.ini into `dir`
///
/// `genome` is written verbatim as the GRCH38 genome value.
pub fn write_install(dir: &Path, genome: &str) {
    let data = dir.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("PVS1.level"), "BRCA1\tVS\nTP53\tS\n").unwrap();
    fs::write(data.join("gene_alias.tsv"), "RNF53\tBRCA1\n").unwrap();
    fs::write(data.join("genes.tsv"), "BRCA1\tNM_007294\nTP53\tNM_000546\n").unwrap();
    fs::write(data.join("refgene.txt"), REFGENE).unwrap();
    fs::write(data.join("domain.bed"), DOMAINS).unwrap();
    fs::write(data.join("hotspot.bed"), HOTSPOTS).unwrap();
    fs::write(data.join("curated.bed"), CURATED).unwrap();
    fs::write(data.join("exon_popmax.bed"), EXON_POPMAX).unwrap();
    fs::write(data.join("pathogenic.tsv"), SITES).unwrap();

    let config = format!(
        "[DEFAULT]
pvs1levels = data/PVS1.level
gene_alias = data/gene_alias.tsv
gene_trans = data/genes.tsv

[GRCH38]
genome = {genome}
transcript = data/refgene.txt
domain = data/domain.bed
hotspot = data/hotspot.bed
curated_region = data/curated.bed
exon_lof_popmax = data/exon_popmax.bed
pathogenic_site = data/pathogenic.tsv
"
    );
    fs::write(dir.join("config.ini"), config).unwrap();
}

/// Write the test FASTA to `path`
pub fn write_genome(path: &Path) {
    fs::write(path, FASTA).unwrap();
}
