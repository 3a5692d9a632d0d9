mod helpers;

use olivetti::memory::types::{BankKey, BankKind, Lane};
use olivetti::storage::health::check_snapshot_health;
use tempfile::TempDir;

#[test]
fn open_at_nonexistent_path_starts_empty() {
    let tmp = TempDir::new().unwrap();
    let config = helpers::test_config(&tmp);
    let path = config.resolved_snapshot_path();

    // Parent directory does not exist yet either.
    assert!(!path.parent().unwrap().exists());

    let mut engine = helpers::open_engine(&config);
    assert!(engine.state().banks.is_empty());
    assert!(engine.restored_from().is_none());
    assert!(!path.exists());

    engine
        .ingest_sample(Lane::Narration, "Noir", BankKind::Style, "The fog came in.", None)
        .unwrap();
    assert!(path.exists());
}

#[test]
fn health_report_tracks_the_chain() {
    let tmp = TempDir::new().unwrap();
    let store = helpers::test_store(&tmp);
    let mut engine = helpers::test_engine(&tmp);

    let report = check_snapshot_health(&store);
    assert!(report.recoverable_slot().is_none());
    assert!(report.slots.iter().all(|s| !s.exists));

    engine.set_payload(serde_json::json!(1)).unwrap();
    engine.set_payload(serde_json::json!(2)).unwrap();
    std::fs::write(store.path(), b"{ broken").unwrap();

    let report = check_snapshot_health(&store);
    assert!(!report.primary_ok());
    assert_eq!(report.recoverable_slot().unwrap().slot, ".bak");
    assert!(!report.stale_temp_file);
}

#[test]
fn dimension_change_then_re_embed() {
    let tmp = TempDir::new().unwrap();
    let mut config = helpers::test_config(&tmp);
    config.embedding.dimensions = 64;

    let mut engine = helpers::open_engine(&config);
    engine
        .ingest_sample(Lane::Dialogue, "noir", BankKind::Style, "\"Scram,\" he said.", None)
        .unwrap();
    drop(engine);

    // Reopen with a wider encoder: old vectors load as-is.
    config.embedding.dimensions = 128;
    let mut engine = helpers::open_engine(&config);
    let key = BankKey::new(BankKind::Style, Lane::Dialogue, "noir").unwrap();
    assert_eq!(engine.bank(&key).unwrap().dimensions(), 64);

    // Mismatched lengths score zero until the bank is re-encoded.
    let stale = engine.retrieve_exemplars(Lane::Dialogue, "noir", BankKind::Style, "scram", 1);
    assert_eq!(stale[0].score, 0.0);

    assert_eq!(engine.reencode_all().unwrap(), 1);
    let fresh = engine.retrieve_exemplars(Lane::Dialogue, "noir", BankKind::Style, "scram", 1);
    assert!(fresh[0].score > 0.0);
    drop(engine);

    let reopened = helpers::open_engine(&config);
    let bank = reopened.bank(&key).unwrap();
    assert_eq!(bank.dimensions(), 128);
    assert!(bank.samples().all(|s| s.vector.len() == 128));
}

#[test]
fn lowered_capacity_trims_oldest_on_restore() {
    let tmp = TempDir::new().unwrap();
    let mut config = helpers::test_config(&tmp);
    config.embedding.dimensions = 16;

    let mut engine = helpers::open_engine(&config);
    for i in 0..5 {
        engine
            .ingest_sample(Lane::Action, "Me", BankKind::Voice, &helpers::numbered_text(i), None)
            .unwrap();
    }
    drop(engine);

    config.memory.voice_capacity = 3;
    let engine = helpers::open_engine(&config);
    let key = BankKey::new(BankKind::Voice, Lane::Action, "Me").unwrap();
    let texts: Vec<String> = engine.bank(&key).unwrap().samples().map(|s| s.text.clone()).collect();
    assert_eq!(
        texts,
        vec![helpers::numbered_text(2), helpers::numbered_text(3), helpers::numbered_text(4)]
    );
}

#[test]
fn independent_engines_do_not_share_state() {
    let a_dir = TempDir::new().unwrap();
    let b_dir = TempDir::new().unwrap();
    let mut a = helpers::test_engine(&a_dir);
    let b = helpers::test_engine(&b_dir);

    a.ingest_sample(Lane::Narration, "Noir", BankKind::Style, "Only in A.", None)
        .unwrap();
    assert!(b.state().banks.is_empty());
    assert!(!b.store().has_snapshot());
}
