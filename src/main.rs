//! pvs1-refdata CLI entry point
//!
//! Pre-flight checks and quick lookups against an installed reference data
//! directory.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pvs1_refdata::{default_install_dir, ReferenceRegistry};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pvs1-refdata")]
#[command(about = "Inspect and validate PVS1 reference data")]
#[command(version)]
struct Cli {
    /// Directory containing config.ini (default: $PVS1_REFDATA_DIR or the executable's directory)
    #[arg(short = 'd', long = "install-dir", global = true)]
    install_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the shared tables and the given builds (all builds if none given)
    Check {
        /// Genome build to load (repeatable)
        #[arg(short = 'b', long = "build")]
        builds: Vec<String>,
    },
    /// Resolve a gene symbol and show its transcript and PVS1 level
    Gene {
        /// Gene symbol (aliases accepted)
        symbol: String,
    },
    /// Show annotated intervals covering a position
    Regions {
        /// Genome build
        #[arg(short = 'b', long, default_value = "GRCh38")]
        build: String,
        /// Chromosome name
        chrom: String,
        /// 0-based position
        pos: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let install_dir = match cli.install_dir {
        Some(dir) => dir,
        None => default_install_dir().context("Cannot determine install directory")?,
    };
    let registry = ReferenceRegistry::open(&install_dir)
        .with_context(|| format!("Failed to load reference data from {:?}", install_dir))?;

    match cli.command {
        Commands::Check { builds } => {
            let builds = if builds.is_empty() {
                registry.config().builds().map(str::to_string).collect()
            } else {
                builds
            };

            eprintln!("=== Shared tables ===");
            eprintln!("PVS1 levels:      {}", registry.pvs1_levels().len());
            eprintln!("Gene aliases:     {}", registry.gene_alias().len());
            eprintln!("Gene transcripts: {}", registry.gene_trans().len());

            for build in &builds {
                let data = registry.get_build_data(build)?;
                eprintln!("\n=== {} ===", data.build);
                eprintln!("Genome:           {:?} ({} sequences)", data.genome.path(), data.genome.len());
                eprintln!("Transcripts:      {}", data.transcripts.len());
                eprintln!("Domains:          {}", data.domain.len());
                eprintln!("Hotspots:         {}", data.hotspot.len());
                eprintln!("Curated regions:  {}", data.curated_region.len());
                eprintln!("LoF popmax exons: {}", data.exon_lof_popmax.len());
                eprintln!("Pathogenic sites: {}", data.pathogenic.len());
            }
            eprintln!("\nTime elapsed:     {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Gene { symbol } => {
            let gene = registry.gene_alias().canonical(&symbol);
            if gene != symbol {
                println!("{}\talias of {}", symbol, gene);
            }
            let transcript = registry.gene_trans().transcript(gene).unwrap_or(".");
            let level = registry.pvs1_levels().level(gene).unwrap_or(".");
            println!("{}\t{}\t{}", gene, transcript, level);
        }

        Commands::Regions { build, chrom, pos } => {
            let data = registry.get_build_data(&build)?;
            let sets = [
                ("domain", &data.domain),
                ("hotspot", &data.hotspot),
                ("curated_region", &data.curated_region),
                ("exon_lof_popmax", &data.exon_lof_popmax),
            ];
            for (label, set) in sets {
                for iv in set.query_intervals(&chrom, pos, pos.saturating_add(1)) {
                    println!("{}\t{}\t{}\t{}\t{}", label, iv.val.chrom, iv.start, iv.stop, iv.val.name);
                }
            }
            if let Some(site) = data.pathogenic.get(&chrom, pos) {
                println!("pathogenic_site\t{}\t{}\t{}", site.chrom, site.pos, site.annotation.join("\t"));
            }
        }
    }

    Ok(())
}
