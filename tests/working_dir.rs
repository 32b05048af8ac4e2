//! Genome path resolution against the working directory
//!
//! Kept in its own test binary: changing the working directory affects the
//! whole process.

mod common;

use pvs1_refdata::{FormatError, RefDataError, ReferenceRegistry};
use std::env;

#[test]
fn test_relative_genome_resolves_against_working_dir_at_call_time() {
    let install = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    common::write_install(install.path(), "hg38.fa");

    // constructed before the working directory changes
    let registry = ReferenceRegistry::open(install.path()).unwrap();
    assert_eq!(registry.config().get("GRCH38", "genome").unwrap(), "hg38.fa");

    env::set_current_dir(work.path()).unwrap();
    let cwd = env::current_dir().unwrap();
    let expected = cwd.join("hg38.fa");
    assert_eq!(registry.genome_path("grch38").unwrap(), expected);

    // not staged yet: the load fails on the working-directory path
    match registry.get_build_data("GRCH38") {
        Err(RefDataError::Resource { key, path, source: FormatError::Io(_) }) => {
            assert_eq!(key, "genome");
            assert_eq!(path, expected);
        }
        other => panic!("expected a genome load error, got {:?}", other.map(|d| d.build.clone())),
    }
    assert!(!registry.is_cached("GRCH38"));

    // the orchestrator stages the genome after startup
    common::write_genome(&expected);
    let data = registry.get_build_data("GRCH38").unwrap();
    assert_eq!(data.genome.path(), expected.as_path());
    assert!(cwd.join("hg38.fa.fai").exists());

    // other resources still come from the install directory
    assert!(!cwd.join("data").exists());
    assert_eq!(data.domain.len(), 1);
}
