//! Library persistence and JSON backups on a real sled store.

use super::test_utils::sample_plan;
use itafacile::error::LibraryError;
use itafacile::library::{
    CredentialStore, KvStore, Library, LibraryConfig, SledKvStore, LIBRARY_KEY,
};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn open_library(dir: &TempDir) -> (Library, Arc<SledKvStore>) {
    let store = Arc::new(SledKvStore::open(dir.path().join("store")).unwrap());
    (Library::new(store.clone(), LibraryConfig::default()), store)
}

fn topics(library: &Library) -> Vec<String> {
    library
        .list()
        .unwrap()
        .into_iter()
        .map(|lesson| lesson.topic)
        .collect()
}

#[test]
fn resaving_a_topic_updates_and_moves_it_to_front() {
    let dir = TempDir::new().unwrap();
    let (library, _) = open_library(&dir);

    library.save(&sample_plan("Animali")).unwrap();
    library.save(&sample_plan("Cibo")).unwrap();
    library.save(&sample_plan("animali ")).unwrap();

    assert_eq!(topics(&library), vec!["animali ", "Cibo"]);
}

#[test]
fn library_survives_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    {
        let (library, _) = open_library(&dir);
        library.save(&sample_plan("Colori")).unwrap();
    }
    let (library, _) = open_library(&dir);
    let lesson = library.find("COLORI").unwrap().unwrap();
    assert_eq!(lesson, library.list().unwrap()[0]);
}

#[test]
fn export_then_import_into_fresh_library() {
    let source_dir = TempDir::new().unwrap();
    let (source, _) = open_library(&source_dir);
    source.save(&sample_plan("Animali")).unwrap();
    source.save(&sample_plan("Cibo")).unwrap();

    let backup = source_dir.path().join("itafacile-backup.json");
    assert_eq!(source.export_to_file(&backup).unwrap(), 2);

    let target_dir = TempDir::new().unwrap();
    let (target, _) = open_library(&target_dir);
    target.save(&sample_plan("Scuola")).unwrap();
    target.save(&sample_plan("CIBO")).unwrap();

    let outcome = target.import_from_file(&backup).unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped_duplicates, 1);
    // existing entries keep their place, new ones are appended
    assert_eq!(topics(&target), vec!["CIBO", "Scuola", "Animali"]);
}

#[test]
fn non_array_backup_leaves_library_unchanged() {
    let dir = TempDir::new().unwrap();
    let (library, store) = open_library(&dir);
    library.save(&sample_plan("Animali")).unwrap();
    let before = store.get(LIBRARY_KEY).unwrap();

    let file = dir.path().join("backup.json");
    std::fs::write(&file, r#"{"topic": "Cibo", "items": []}"#).unwrap();

    let err = library.import_from_file(&file).unwrap_err();
    assert!(matches!(err, LibraryError::NotAnArray));
    assert_eq!(store.get(LIBRARY_KEY).unwrap(), before);
}

#[test]
fn invalid_json_backup_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (library, _) = open_library(&dir);
    let file = dir.path().join("backup.json");
    std::fs::write(&file, "[{\"topic\": ").unwrap();

    assert!(matches!(
        library.import_from_file(&file),
        Err(LibraryError::InvalidJson(_))
    ));
    assert!(library.list().unwrap().is_empty());
}

#[test]
fn original_backup_format_is_accepted() {
    let dir = TempDir::new().unwrap();
    let (library, _) = open_library(&dir);
    let backup = r#"[
        {"topic": "Il mare", "items": [
            {"id": "k3j9x0a1b", "type": "FLASHCARD", "content": {"italian": "onda", "emoji": "🌊", "exampleSentence": "L'onda è alta."}},
            {"id": "p0q9r8s7t", "type": "SCRAMBLE", "content": {"sentence": "Il mare è blu.", "words": ["blu.", "mare", "Il", "è"]}}
        ]},
        {"topic": "Rotto", "items": [{"id": "x", "type": "QUIZ", "content": {"italian": "no"}}]}
    ]"#;

    let outcome = library.import(backup).unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped_invalid, 1);
    let lesson = library.find("il mare").unwrap().unwrap();
    assert_eq!(lesson.items[0].id, "k3j9x0a1b");
}

#[test]
fn credential_and_library_use_independent_keys() {
    let dir = TempDir::new().unwrap();
    let (library, store) = open_library(&dir);
    let credentials = CredentialStore::new(store);

    credentials.set("  AIzaSyExample  ").unwrap();
    library.save(&sample_plan("Animali")).unwrap();
    credentials.clear().unwrap();

    assert_eq!(credentials.get().unwrap(), None);
    assert_eq!(topics(&library), vec!["Animali"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn library_never_exceeds_its_caps(saves in 0usize..40, imported in 0usize..80) {
        let dir = TempDir::new().unwrap();
        let (library, _) = open_library(&dir);

        for i in 0..saves {
            library.save(&sample_plan(&format!("Salvata {}", i))).unwrap();
        }
        prop_assert!(library.list().unwrap().len() <= 20);

        let backup: Vec<_> = (0..imported)
            .map(|i| sample_plan(&format!("Importata {}", i)))
            .collect();
        library.import(&serde_json::to_string(&backup).unwrap()).unwrap();
        let len = library.list().unwrap().len();
        prop_assert!(len <= 50);
        prop_assert_eq!(len, (saves.min(20) + imported).min(50));
    }
}
