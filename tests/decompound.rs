use decompound_core::persistence::{
    self, ARCHIVE_FILE, INDEX_FILE, MANIFEST_FILE, PREFIX34_FILE, TERMS_FILE,
};
use decompound_core::{Decompounder, Dictionary, DictionaryError, DictionaryWriter, Error, Locale};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const DONAU: &str = "donaudampfschifffahrtsgesellschaftskapitan";

fn write_german(dir: &Path) {
    let mut writer = DictionaryWriter::new();
    writer.extend([
        "donau",
        "dampf",
        "schiff",
        "fahrt",
        "gesell",
        "schaft",
        "kapitan",
        "schifffahrt",
        "dampfschifffahrt",
        "donaudampfschifffahrt",
        "gesellschaft",
        "gesellschaftskapitan",
        "wartung",
        "vertrag",
        "schule",
        "kunstlerin",
    ]);
    writer.write(dir).unwrap();
}

#[test]
fn german_locale_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    write_german(tmp.path());

    let mut decompounder = Locale::German.decompounder(tmp.path()).unwrap();
    assert_eq!(
        decompounder.decompound_term(DONAU),
        vec![
            "dampf",
            "dampfschifffahrt",
            "donau",
            "donaudampfschifffahrt",
            "fahrt",
            "gesell",
            "gesellschaft",
            "gesellschaftskapitan",
            "kapitan",
            "schaft",
            "schiff",
            "schifffahrt",
        ]
    );
    assert_eq!(
        decompounder.decompound_term("wartungsvertrag"),
        vec!["vertrag", "wartung"]
    );
    assert_eq!(decompounder.decompound_term("schulhof"), vec!["hof", "schule"]);
    assert!(decompounder.decompound_term("dampf").is_empty());
}

#[test]
fn second_start_reuses_derived_files() {
    let tmp = tempfile::tempdir().unwrap();
    write_german(tmp.path());

    let first = persistence::load_dictionary(tmp.path()).unwrap();
    let terms_written = fs::metadata(tmp.path().join(TERMS_FILE))
        .unwrap()
        .modified()
        .unwrap();

    let second = persistence::load_dictionary(tmp.path()).unwrap();
    let terms_after = fs::metadata(tmp.path().join(TERMS_FILE))
        .unwrap()
        .modified()
        .unwrap();

    assert_eq!(terms_written, terms_after);
    assert_eq!(first.len(), second.len());
    assert!(second.has("gesellschaftskapitan"));
}

#[test]
fn damaged_derived_files_are_regenerated() {
    let tmp = tempfile::tempdir().unwrap();
    write_german(tmp.path());
    let pristine = persistence::load_dictionary(tmp.path()).unwrap();

    // Offsets past the end of the blob.
    fs::write(tmp.path().join(INDEX_FILE), [0xFFu8; 16]).unwrap();
    fs::write(tmp.path().join(MANIFEST_FILE), b"garbage").unwrap();

    let repaired = persistence::load_dictionary(tmp.path()).unwrap();
    assert_eq!(repaired.len(), pristine.len());
    assert!(repaired.has("donau"));
    assert_eq!(
        fs::read(tmp.path().join(INDEX_FILE)).unwrap(),
        pristine.index_bytes()
    );
}

fn crowded_prefix_terms() -> Vec<String> {
    let mut terms: Vec<String> = (0..3000).map(|i| format!("sch{i:05}")).collect();
    terms.extend((0..700).map(|i| format!("sc{i}")));
    terms.extend((0..600).map(|i| format!("ü{i}x")));
    terms
}

#[test]
fn crowded_prefixes_survive_the_disk_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let terms = crowded_prefix_terms();
    let mut writer = DictionaryWriter::new();
    writer.extend(terms.iter().cloned());
    writer.write(tmp.path()).unwrap();

    let absent: Vec<String> = (3000..3100)
        .map(|i| format!("sch{i:05}"))
        .chain((700..750).map(|i| format!("sc{i}")))
        .chain((0..50).map(|i| format!("ü{i}")))
        .chain(["s", "sc", "sch", "sch0", "scha", "ü"].map(String::from))
        .collect();

    let decoded = persistence::load_dictionary(tmp.path()).unwrap();
    assert!(!fs::read(tmp.path().join(PREFIX34_FILE)).unwrap().is_empty());
    let cached = persistence::load_dictionary(tmp.path()).unwrap();

    for dictionary in [&decoded, &cached] {
        assert_eq!(dictionary.len(), terms.len());
        for term in &terms {
            assert!(dictionary.has(term), "missing {term}");
        }
        for term in &absent {
            assert!(!dictionary.has(term), "unexpected {term}");
        }
    }
    assert_eq!(decoded.prefix34_bytes(), cached.prefix34_bytes());
}

#[test]
fn missing_dictionary_surfaces_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let result = Locale::Dutch.decompounder(tmp.path());
    assert!(matches!(
        result,
        Err(Error::Dictionary(DictionaryError::ArchiveNotFound(path)))
            if path.ends_with(ARCHIVE_FILE)
    ));
}

#[test]
fn truncated_archive_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write_german(tmp.path());
    let archive = fs::read(tmp.path().join(ARCHIVE_FILE)).unwrap();
    fs::write(tmp.path().join(ARCHIVE_FILE), &archive[..archive.len() / 2]).unwrap();

    assert!(persistence::load_dictionary(tmp.path()).is_err());
}

#[test]
fn one_dictionary_many_threads() {
    let tmp = tempfile::tempdir().unwrap();
    write_german(tmp.path());
    let dictionary: Arc<dyn Dictionary> =
        Arc::new(persistence::load_dictionary(tmp.path()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dictionary = Arc::clone(&dictionary);
            std::thread::spawn(move || {
                let config = Locale::German.policy().into_configuration(dictionary).unwrap();
                Decompounder::new(config).decompound_term("kunstlerinnenvertrag")
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec!["kunstlerinnen", "vertrag"]);
    }
}
