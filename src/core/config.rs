//! INI configuration with install-directory path resolution
//!
//! The configuration has a `DEFAULT` section for build-independent tables and
//! one section per genome build. Every path is rewritten against the install
//! directory when the file is read, except keys whose [`PathResolution`] is
//! [`PathResolution::AccessTime`]; those are resolved against the working
//! directory when the resource is first opened.

use crate::core::error::{ConfigError, ConfigResult};
use ini::{Ini, ParseOption};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the install directory
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Section holding build-independent resources and option defaults
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// When a configured relative path is turned into an absolute one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResolution {
    /// Joined onto the install directory when the configuration is read
    InstallTime,
    /// Joined onto the current working directory when the file is opened
    AccessTime,
}

/// Resources named by the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Pvs1Levels,
    GeneAlias,
    GeneTrans,
    Genome,
    Transcript,
    Domain,
    Hotspot,
    CuratedRegion,
    ExonLofPopmax,
    PathogenicSite,
}

impl ResourceKey {
    /// Keys required in the `DEFAULT` section
    pub const SHARED: [ResourceKey; 3] = [Self::Pvs1Levels, Self::GeneAlias, Self::GeneTrans];

    /// Keys required in every build section
    pub const PER_BUILD: [ResourceKey; 7] = [
        Self::Genome,
        Self::Transcript,
        Self::Domain,
        Self::Hotspot,
        Self::CuratedRegion,
        Self::ExonLofPopmax,
        Self::PathogenicSite,
    ];

    /// Option name as written in the configuration file
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pvs1Levels => "pvs1levels",
            Self::GeneAlias => "gene_alias",
            Self::GeneTrans => "gene_trans",
            Self::Genome => "genome",
            Self::Transcript => "transcript",
            Self::Domain => "domain",
            Self::Hotspot => "hotspot",
            Self::CuratedRegion => "curated_region",
            Self::ExonLofPopmax => "exon_lof_popmax",
            Self::PathogenicSite => "pathogenic_site",
        }
    }

    /// Look up a key by option name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::SHARED
            .iter()
            .chain(Self::PER_BUILD.iter())
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
    }

    /// Resolution policy for this resource
    ///
    /// The genome is staged into the working directory by the workflow
    /// engine after the process starts.
    pub fn resolution(self) -> PathResolution {
        match self {
            Self::Genome => PathResolution::AccessTime,
            _ => PathResolution::InstallTime,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution policy for an arbitrary option name
///
/// Options not named by [`ResourceKey`] are treated as install-time paths.
pub fn resolution_for(option: &str) -> PathResolution {
    ResourceKey::from_name(option)
        .map(ResourceKey::resolution)
        .unwrap_or(PathResolution::InstallTime)
}

/// Join a relative path onto `base`; absolute paths are returned unchanged
pub fn resolve_against(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Parsed configuration: section → (option → value)
#[derive(Debug, Clone)]
pub struct Config {
    install_dir: PathBuf,
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Read `config.ini` from the install directory
    pub fn from_install_dir<P: AsRef<Path>>(install_dir: P) -> ConfigResult<Self> {
        let install_dir = install_dir.as_ref();
        let path = install_dir.join(CONFIG_FILE_NAME);

        let ini = Ini::load_from_file_opt(&path, parse_options()).map_err(|e| match e {
            ini::Error::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                ConfigError::NotFound(path.clone())
            }
            other => ConfigError::Parse {
                path: path.clone(),
                message: other.to_string(),
            },
        })?;

        Self::from_ini(ini, install_dir, &path)
    }

    /// Parse configuration text, resolving paths against `install_dir`
    pub fn from_str_with_install_dir<P: AsRef<Path>>(text: &str, install_dir: P) -> ConfigResult<Self> {
        let install_dir = install_dir.as_ref();
        let origin = install_dir.join(CONFIG_FILE_NAME);
        let ini = Ini::load_from_str_opt(text, parse_options()).map_err(|e| ConfigError::Parse {
            path: origin.clone(),
            message: e.to_string(),
        })?;

        Self::from_ini(ini, install_dir, &origin)
    }

    fn from_ini(ini: Ini, install_dir: &Path, origin: &Path) -> ConfigResult<Self> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

        for (name, properties) in ini.iter() {
            let Some(name) = name else {
                if properties.iter().next().is_some() {
                    return Err(ConfigError::MissingSectionHeader(origin.to_path_buf()));
                }
                continue;
            };

            let section = sections.entry(name.to_string()).or_default();
            for (option, value) in properties.iter() {
                let option = option.to_lowercase();
                let value = match resolution_for(&option) {
                    PathResolution::InstallTime => resolve_against(install_dir, value.trim())
                        .to_string_lossy()
                        .into_owned(),
                    PathResolution::AccessTime => value.trim().to_string(),
                };
                section.insert(option, value);
            }
        }

        Ok(Self {
            install_dir: install_dir.to_path_buf(),
            sections,
        })
    }

    /// Directory the configuration was read from
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Check if a section exists
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Names of all build sections (everything except `DEFAULT`)
    pub fn builds(&self) -> impl Iterator<Item = &str> {
        self.sections
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_SECTION)
    }

    /// Raw option value, falling back to `DEFAULT` for build sections
    ///
    /// Install-time paths are already absolute; access-time values are
    /// returned as written.
    pub fn get(&self, section: &str, option: &str) -> ConfigResult<&str> {
        let values = self
            .sections
            .get(section)
            .ok_or_else(|| ConfigError::MissingSection(section.to_string()))?;
        let option = option.to_lowercase();

        values
            .get(&option)
            .or_else(|| self.sections.get(DEFAULT_SECTION)?.get(&option))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: option,
            })
    }

    /// Fully resolved path for a resource
    ///
    /// Access-time keys are joined onto `working_dir` if they are relative.
    pub fn resource_path(&self, section: &str, key: ResourceKey, working_dir: &Path) -> ConfigResult<PathBuf> {
        let value = self.get(section, key.as_str())?;
        Ok(match key.resolution() {
            PathResolution::InstallTime => PathBuf::from(value),
            PathResolution::AccessTime => resolve_against(working_dir, value),
        })
    }
}

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "\
[DEFAULT]
pvs1levels = data/PVS1.level
gene_alias = data/hgnc.symbol.previous.tsv
gene_trans = /opt/shared/clinvar_trans_stats.tsv

[GRCH38]
genome = hg38.fa
transcript = data/ncbiRefSeq_hg38.gpe
domain = data/functional_domains_hg38.bed
hotspot = data/expert_curated_hotspot_hg38.bed
curated_region = data/expert_curated_domains_hg38.bed
exon_lof_popmax = data/exon_lof_popmax_hg38.bed
pathogenic_site = data/clinvar_pathogenic_GRCh38.vcf
";

    fn config() -> Config {
        Config::from_str_with_install_dir(CONFIG, "/opt/autopvs1").unwrap()
    }

    #[test]
    fn test_relative_paths_rewritten_to_install_dir() {
        let config = config();
        assert_eq!(
            config.get("DEFAULT", "pvs1levels").unwrap(),
            "/opt/autopvs1/data/PVS1.level"
        );
        assert_eq!(
            config.get("GRCH38", "domain").unwrap(),
            "/opt/autopvs1/data/functional_domains_hg38.bed"
        );
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let config = config();
        assert_eq!(
            config.get("DEFAULT", "gene_trans").unwrap(),
            "/opt/shared/clinvar_trans_stats.tsv"
        );
    }

    #[test]
    fn test_genome_kept_relative() {
        let config = config();
        assert_eq!(config.get("GRCH38", "genome").unwrap(), "hg38.fa");

        let path = config
            .resource_path("GRCH38", ResourceKey::Genome, Path::new("/work"))
            .unwrap();
        assert_eq!(path, PathBuf::from("/work/hg38.fa"));
    }

    #[test]
    fn test_install_time_key_ignores_working_dir() {
        let config = config();
        let path = config
            .resource_path("GRCH38", ResourceKey::Hotspot, Path::new("/work"))
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/opt/autopvs1/data/expert_curated_hotspot_hg38.bed")
        );
    }

    #[test]
    fn test_build_section_falls_back_to_default() {
        let config = config();
        assert_eq!(
            config.get("GRCH38", "gene_alias").unwrap(),
            "/opt/autopvs1/data/hgnc.symbol.previous.tsv"
        );
    }

    #[test]
    fn test_option_names_case_insensitive() {
        let text = "[DEFAULT]\nPVS1Levels = levels.tsv\n";
        let config = Config::from_str_with_install_dir(text, "/srv").unwrap();
        assert_eq!(config.get("DEFAULT", "PVS1LEVELS").unwrap(), "/srv/levels.tsv");
    }

    #[test]
    fn test_missing_section_and_key() {
        let config = config();
        assert!(matches!(
            config.get("GRCH37", "genome"),
            Err(ConfigError::MissingSection(s)) if s == "GRCH37"
        ));
        assert!(matches!(
            config.get("GRCH38", "morbidmap"),
            Err(ConfigError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_builds_excludes_default() {
        let config = config();
        let builds: Vec<&str> = config.builds().collect();
        assert_eq!(builds, vec!["GRCH38"]);
    }

    #[test]
    fn test_entries_before_first_section_rejected() {
        let text = "genome = hg19.fa\n[GRCH37]\ndomain = d.bed\n";
        let err = Config::from_str_with_install_dir(text, "/srv").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSectionHeader(_)));
    }

    #[test]
    fn test_unterminated_section_header_is_parse_error() {
        let text = "[DEFAULT]\npvs1levels = l.tsv\n[GRCH38\ngenome = hg38.fa\n";
        let err = Config::from_str_with_install_dir(text, "/srv").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_install_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_resolution_policy() {
        assert_eq!(resolution_for("genome"), PathResolution::AccessTime);
        assert_eq!(resolution_for("GENOME"), PathResolution::AccessTime);
        assert_eq!(resolution_for("domain"), PathResolution::InstallTime);
        assert_eq!(resolution_for("morbidmap"), PathResolution::InstallTime);
    }

    #[test]
    fn test_resource_key_names_round_trip() {
        for key in ResourceKey::SHARED.iter().chain(ResourceKey::PER_BUILD.iter()) {
            assert_eq!(ResourceKey::from_name(key.as_str()), Some(*key));
        }
    }
}
