use super::*;

fn model(name: &str) -> ModelName {
    ModelName::from(name)
}

#[test]
fn memory_store_commit_and_get() {
    let store = MemoryWatermarkStore::new();
    let orders = model("orders");

    assert!(store.get(&orders).unwrap().is_none());

    store
        .commit(&orders, Watermark::new("2024-06-01 12:00:00"))
        .unwrap();
    let mark = store.get(&orders).unwrap().unwrap();
    assert_eq!(mark.cutoff, "2024-06-01 12:00:00");

    store.clear(&orders).unwrap();
    assert!(store.get(&orders).unwrap().is_none());
}

#[test]
fn commit_overwrites_previous_mark() {
    let store = MemoryWatermarkStore::new();
    let orders = model("orders");

    store.commit(&orders, Watermark::new("100")).unwrap();
    store.commit(&orders, Watermark::new("250")).unwrap();

    assert_eq!(store.get(&orders).unwrap().unwrap().cutoff, "250");
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("watermarks.json");

    let store = FileWatermarkStore::new(&path);
    store
        .commit(&model("orders"), Watermark::new("2024-06-01"))
        .unwrap();
    store
        .commit(&model("events"), Watermark::new("2024-07-15"))
        .unwrap();

    let reopened = FileWatermarkStore::new(&path);
    assert_eq!(
        reopened.get(&model("orders")).unwrap().unwrap().cutoff,
        "2024-06-01"
    );
    assert_eq!(
        reopened.get(&model("events")).unwrap().unwrap().cutoff,
        "2024-07-15"
    );
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn file_store_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileWatermarkStore::new(dir.path().join("watermarks.json"));

    assert!(store.get(&model("orders")).unwrap().is_none());
    // Clearing a mark that was never committed is a no-op.
    store.clear(&model("orders")).unwrap();
}

#[test]
fn file_store_clear_removes_only_that_model() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileWatermarkStore::new(dir.path().join("watermarks.json"));

    store.commit(&model("a"), Watermark::new("1")).unwrap();
    store.commit(&model("b"), Watermark::new("2")).unwrap();
    store.clear(&model("a")).unwrap();

    assert!(store.get(&model("a")).unwrap().is_none());
    assert_eq!(store.get(&model("b")).unwrap().unwrap().cutoff, "2");
}

#[test]
fn clear_all_resets_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watermarks.json");
    let store = FileWatermarkStore::new(&path);

    store.commit(&model("a"), Watermark::new("1")).unwrap();
    store.clear_all().unwrap();

    assert!(!path.exists());
    assert!(store.get(&model("a")).unwrap().is_none());
}
