//! Reference data registry
//!
//! Owns the parsed configuration, the build-independent tables loaded at
//! construction, and a per-build cache of lazily loaded datasets.
//!
//! # Example
//!
//! ```ignore
//! use pvs1_refdata::ReferenceRegistry;
//!
//! let registry = ReferenceRegistry::open("/opt/autopvs1")?;
//! let grch38 = registry.get_build_data("grch38")?;
//! let hotspots = grch38.hotspot.covering("chr17", 43045705);
//! ```

use crate::core::config::{Config, ResourceKey, DEFAULT_SECTION};
use crate::core::error::{FormatResult, RefDataError, Result};
use crate::formats::{
    GeneAliases, GeneTranscriptMap, IndexedGenome, IntervalSet, PathogenicSites, Pvs1Levels,
    TranscriptTable,
};
use log::{debug, info};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, TryLockError};
use std::time::Instant;

/// Environment variable overriding the install directory of the global registry
pub const INSTALL_DIR_ENV: &str = "PVS1_REFDATA_DIR";

/// Everything loaded for one genome build
#[derive(Debug)]
pub struct BuildDataset {
    /// Normalized (uppercase) build identifier
    pub build: String,
    pub genome: IndexedGenome,
    pub transcripts: TranscriptTable,
    pub domain: IntervalSet,
    pub hotspot: IntervalSet,
    pub curated_region: IntervalSet,
    pub exon_lof_popmax: IntervalSet,
    pub pathogenic: PathogenicSites,
}

/// Loaders for build-specific resources
///
/// [`FileLoader`] reads the real files; tests substitute their own to
/// observe how often each loader runs.
pub trait DatasetLoader: Send + Sync {
    fn load_genome(&self, path: &Path) -> FormatResult<IndexedGenome>;
    fn load_transcripts(&self, path: &Path) -> FormatResult<TranscriptTable>;
    fn load_intervals(&self, path: &Path) -> FormatResult<IntervalSet>;
    fn load_pathogenic_sites(&self, path: &Path) -> FormatResult<PathogenicSites>;
}

/// Reads build resources from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl DatasetLoader for FileLoader {
    fn load_genome(&self, path: &Path) -> FormatResult<IndexedGenome> {
        IndexedGenome::open(path)
    }

    fn load_transcripts(&self, path: &Path) -> FormatResult<TranscriptTable> {
        TranscriptTable::from_path(path)
    }

    fn load_intervals(&self, path: &Path) -> FormatResult<IntervalSet> {
        IntervalSet::from_path(path)
    }

    fn load_pathogenic_sites(&self, path: &Path) -> FormatResult<PathogenicSites> {
        PathogenicSites::from_path(path)
    }
}

/// Cache slot for one build; empty until a load succeeds
type BuildSlot = Arc<Mutex<Option<Arc<BuildDataset>>>>;

/// Configuration-driven access to reference datasets
pub struct ReferenceRegistry<L = FileLoader> {
    config: Config,
    pvs1_levels: Pvs1Levels,
    gene_alias: GeneAliases,
    gene_trans: GeneTranscriptMap,
    loader: L,
    cache: Mutex<HashMap<String, BuildSlot>>,
}

impl ReferenceRegistry<FileLoader> {
    /// Read `config.ini` from `install_dir` and load the shared tables
    pub fn open<P: AsRef<Path>>(install_dir: P) -> Result<Self> {
        Self::with_loader(install_dir, FileLoader)
    }
}

impl<L: DatasetLoader> ReferenceRegistry<L> {
    /// Like [`ReferenceRegistry::open`], with a custom build loader
    pub fn with_loader<P: AsRef<Path>>(install_dir: P, loader: L) -> Result<Self> {
        let config = Config::from_install_dir(install_dir)?;
        Self::from_config(config, loader)
    }

    /// Load the shared tables named by an already parsed configuration
    pub fn from_config(config: Config, loader: L) -> Result<Self> {
        let start = Instant::now();

        let pvs1_levels = load_shared(&config, ResourceKey::Pvs1Levels, Pvs1Levels::from_path)?;
        let gene_alias = load_shared(&config, ResourceKey::GeneAlias, GeneAliases::from_path)?;
        let gene_trans = load_shared(&config, ResourceKey::GeneTrans, GeneTranscriptMap::from_path)?;

        info!(
            "Loaded shared tables from {:?}: {} PVS1 levels, {} gene aliases, {} gene transcripts in {:.2}s",
            config.install_dir(),
            pvs1_levels.len(),
            gene_alias.len(),
            gene_trans.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            config,
            pvs1_levels,
            gene_alias,
            gene_trans,
            loader,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pvs1_levels(&self) -> &Pvs1Levels {
        &self.pvs1_levels
    }

    pub fn gene_alias(&self) -> &GeneAliases {
        &self.gene_alias
    }

    pub fn gene_trans(&self) -> &GeneTranscriptMap {
        &self.gene_trans
    }

    /// Dataset for a build, loading it on first request
    ///
    /// `build` is case-insensitive. Concurrent first requests for the same
    /// build load it once; a failed load leaves nothing cached.
    pub fn get_build_data(&self, build: &str) -> Result<Arc<BuildDataset>> {
        let build = self.normalize_build(build)?;
        let slot = self.slot(&build);
        let mut cached = lock(&slot);

        if let Some(dataset) = cached.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let working_dir = std::env::current_dir()?;
        let dataset = Arc::new(self.load_build(&build, &working_dir)?);
        *cached = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Alias of [`ReferenceRegistry::get_build_data`]
    pub fn get_or_load(&self, build: &str) -> Result<Arc<BuildDataset>> {
        self.get_build_data(build)
    }

    /// Genome path a load would open right now
    pub fn genome_path(&self, build: &str) -> Result<PathBuf> {
        let build = self.normalize_build(build)?;
        let working_dir = std::env::current_dir()?;
        Ok(self
            .config
            .resource_path(&build, ResourceKey::Genome, &working_dir)?)
    }

    /// Check whether a build is loaded, without loading it
    ///
    /// A build whose load is still in progress reports `false`.
    pub fn is_cached(&self, build: &str) -> bool {
        let build = build.to_uppercase();
        let slot = lock(&self.cache).get(&build).cloned();
        slot.as_ref().is_some_and(is_loaded)
    }

    /// Builds with a loaded dataset, sorted
    pub fn cached_builds(&self) -> Vec<String> {
        let slots: Vec<(String, BuildSlot)> = lock(&self.cache)
            .iter()
            .map(|(build, slot)| (build.clone(), Arc::clone(slot)))
            .collect();
        let mut builds: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| is_loaded(slot))
            .map(|(build, _)| build)
            .collect();
        builds.sort();
        builds
    }

    fn normalize_build(&self, build: &str) -> Result<String> {
        let build = build.to_uppercase();
        if build == DEFAULT_SECTION || !self.config.has_section(&build) {
            return Err(RefDataError::UnknownBuild(build));
        }
        Ok(build)
    }

    /// Slot for a build, created empty on first use
    ///
    /// The map lock is released before the slot is locked, so loading one
    /// build never blocks requests for another.
    fn slot(&self, build: &str) -> BuildSlot {
        let mut cache = lock(&self.cache);
        Arc::clone(cache.entry(build.to_string()).or_default())
    }

    fn load_build(&self, build: &str, working_dir: &Path) -> Result<BuildDataset> {
        let start = Instant::now();
        info!("Loading reference data for {}", build);

        // every path is resolved before any file is opened
        let path = |key| self.config.resource_path(build, key, working_dir);
        let genome_path = path(ResourceKey::Genome)?;
        let transcript_path = path(ResourceKey::Transcript)?;
        let domain_path = path(ResourceKey::Domain)?;
        let hotspot_path = path(ResourceKey::Hotspot)?;
        let curated_path = path(ResourceKey::CuratedRegion)?;
        let exon_path = path(ResourceKey::ExonLofPopmax)?;
        let sites_path = path(ResourceKey::PathogenicSite)?;

        let loader = &self.loader;
        let genome = timed(ResourceKey::Genome, &genome_path, || loader.load_genome(&genome_path))?;
        let transcripts = timed(ResourceKey::Transcript, &transcript_path, || {
            loader.load_transcripts(&transcript_path)
        })?;
        let domain = timed(ResourceKey::Domain, &domain_path, || loader.load_intervals(&domain_path))?;
        let hotspot = timed(ResourceKey::Hotspot, &hotspot_path, || loader.load_intervals(&hotspot_path))?;
        let curated_region = timed(ResourceKey::CuratedRegion, &curated_path, || {
            loader.load_intervals(&curated_path)
        })?;
        let exon_lof_popmax = timed(ResourceKey::ExonLofPopmax, &exon_path, || {
            loader.load_intervals(&exon_path)
        })?;
        let pathogenic = timed(ResourceKey::PathogenicSite, &sites_path, || {
            loader.load_pathogenic_sites(&sites_path)
        })?;

        info!(
            "Loaded {} in {:.2}s: {} sequences, {} transcripts, {} pathogenic sites",
            build,
            start.elapsed().as_secs_f64(),
            genome.len(),
            transcripts.len(),
            pathogenic.len()
        );

        Ok(BuildDataset {
            build: build.to_string(),
            genome,
            transcripts,
            domain,
            hotspot,
            curated_region,
            exon_lof_popmax,
            pathogenic,
        })
    }
}

fn load_shared<T>(config: &Config, key: ResourceKey, read: fn(PathBuf) -> FormatResult<T>) -> Result<T> {
    let path = PathBuf::from(config.get(DEFAULT_SECTION, key.as_str())?);
    timed(key, &path, || read(path.clone()))
}

/// Run a loader, attaching the key and path to any error
fn timed<T>(key: ResourceKey, path: &Path, load: impl FnOnce() -> FormatResult<T>) -> Result<T> {
    let start = Instant::now();
    let value = load().map_err(|source| RefDataError::Resource {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Loaded {} from {:?} in {:.3}s",
        key,
        path,
        start.elapsed().as_secs_f64()
    );
    Ok(value)
}

/// Lock a mutex; a panic during an earlier load does not poison the cache
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Whether a slot holds a dataset; never waits on an in-flight load
fn is_loaded(slot: &BuildSlot) -> bool {
    match slot.try_lock() {
        Ok(cached) => cached.is_some(),
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().is_some(),
        Err(TryLockError::WouldBlock) => false,
    }
}

static GLOBAL: OnceLock<ReferenceRegistry> = OnceLock::new();

/// Install directory for the global registry
///
/// `PVS1_REFDATA_DIR` if set, otherwise the directory holding the running
/// executable.
pub fn default_install_dir() -> io::Result<PathBuf> {
    if let Some(dir) = std::env::var_os(INSTALL_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let exe = std::env::current_exe()?.canonicalize()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("executable {:?} has no parent directory", exe),
        )
    })
}

/// Initialize the process-wide registry from `install_dir`
///
/// Later calls return the registry created first, whatever directory
/// they pass.
pub fn init<P: AsRef<Path>>(install_dir: P) -> Result<&'static ReferenceRegistry> {
    if let Some(registry) = GLOBAL.get() {
        return Ok(registry);
    }
    let registry = ReferenceRegistry::open(install_dir)?;
    Ok(GLOBAL.get_or_init(|| registry))
}

/// Process-wide registry, initialized from [`default_install_dir`] on first use
pub fn global() -> Result<&'static ReferenceRegistry> {
    match GLOBAL.get() {
        Some(registry) => Ok(registry),
        None => init(default_install_dir()?),
    }
}
